//! Preset registry: the declarative description of every video preset the
//! operator can select, grouped into panel pages.
//!
//! Presets are plain data. Everything here is immutable after config load;
//! the only behavior is lookup by (page, option) index and call-state
//! visibility filtering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-screen position of a picture-in-picture window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipPosition {
    UpperLeft,
    UpperCenter,
    UpperRight,
    CenterLeft,
    CenterRight,
    LowerLeft,
    LowerRight,
}

impl PipPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipPosition::UpperLeft => "UpperLeft",
            PipPosition::UpperCenter => "UpperCenter",
            PipPosition::UpperRight => "UpperRight",
            PipPosition::CenterLeft => "CenterLeft",
            PipPosition::CenterRight => "CenterRight",
            PipPosition::LowerLeft => "LowerLeft",
            PipPosition::LowerRight => "LowerRight",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UpperLeft" => Some(PipPosition::UpperLeft),
            "UpperCenter" => Some(PipPosition::UpperCenter),
            "UpperRight" => Some(PipPosition::UpperRight),
            "CenterLeft" => Some(PipPosition::CenterLeft),
            "CenterRight" => Some(PipPosition::CenterRight),
            "LowerLeft" => Some(PipPosition::LowerLeft),
            "LowerRight" => Some(PipPosition::LowerRight),
            _ => None,
        }
    }
}

/// Logical function assigned to a physical output connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorRole {
    Auto,
    First,
    Second,
    Third,
    PresentationOnly,
    Recorder,
}

impl MonitorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorRole::Auto => "Auto",
            MonitorRole::First => "First",
            MonitorRole::Second => "Second",
            MonitorRole::Third => "Third",
            MonitorRole::PresentationOnly => "PresentationOnly",
            MonitorRole::Recorder => "Recorder",
        }
    }
}

/// Monitor configuration mode for the endpoint as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorTopology {
    Auto,
    Single,
    Dual,
    DualPresentationOnly,
    Triple,
    TriplePresentationOnly,
}

impl MonitorTopology {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorTopology::Auto => "Auto",
            MonitorTopology::Single => "Single",
            MonitorTopology::Dual => "Dual",
            MonitorTopology::DualPresentationOnly => "DualPresentationOnly",
            MonitorTopology::Triple => "Triple",
            MonitorTopology::TriplePresentationOnly => "TriplePresentationOnly",
        }
    }
}

/// Composition mode for a multi-source video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLayout {
    Equal,
    Prominent,
}

impl SourceLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLayout::Equal => "Equal",
            SourceLayout::Prominent => "Prominent",
        }
    }
}

/// Whether a presentation is shared with the far end or shown locally only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendingMode {
    LocalOnly,
    LocalRemote,
}

impl SendingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendingMode::LocalOnly => "LocalOnly",
            SendingMode::LocalRemote => "LocalRemote",
        }
    }
}

/// On/Off toggle used by several self-view fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnOff::On => "On",
            OnOff::Off => "Off",
        }
    }
}

/// Self-view overlay settings. Every field is optional; absent fields are
/// left untouched on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfViewSettings {
    #[serde(default)]
    pub mode: Option<OnOff>,
    #[serde(default)]
    pub fullscreen_mode: Option<OnOff>,
    #[serde(default)]
    pub on_monitor_role: Option<MonitorRole>,
    #[serde(default)]
    pub pip_position: Option<PipPosition>,
}

/// Main video source selection: which camera inputs compose the outgoing
/// main stream, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainVideoSource {
    pub source_ids: Vec<u32>,
    #[serde(default)]
    pub layout: Option<SourceLayout>,
}

/// One presentation instance; the instance number sent to the device is the
/// slot's 1-based position in the preset's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationSlot {
    pub source_ids: Vec<u32>,
    #[serde(default)]
    pub layout: Option<SourceLayout>,
    pub sending_mode: SendingMode,
}

/// Explicit output-to-source route, bypassing automatic layout composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRoute {
    pub output: u32,
    pub source_id: u32,
    #[serde(default)]
    pub layout: Option<SourceLayout>,
}

/// A named bundle of video settings applied as one operator action.
///
/// `in_call` gates panel visibility: `Some(true)` shows the preset only
/// during a call, `Some(false)` only outside one, `None` always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub in_call: Option<bool>,
    #[serde(default)]
    pub self_view: Option<SelfViewSettings>,
    #[serde(default)]
    pub main_video_source: Option<MainVideoSource>,
    #[serde(default)]
    pub layout_name: Option<String>,
    #[serde(default)]
    pub presentations: Vec<PresentationSlot>,
    #[serde(default)]
    pub monitor_roles: Vec<MonitorRole>,
    #[serde(default)]
    pub video_monitors: Option<MonitorTopology>,
    #[serde(default)]
    pub video_matrix: Vec<MatrixRoute>,
    #[serde(default)]
    pub speaker_pip_position: Option<PipPosition>,
}

impl Preset {
    /// Whether this preset should appear on the panel in the given call state.
    pub fn visible(&self, in_call: bool) -> bool {
        match self.in_call {
            None => true,
            Some(required) => required == in_call,
        }
    }
}

/// A panel page: a name and an ordered list of presets. An option's index
/// within the full list is its stable identity, exposed to the panel as the
/// widget value key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub name: String,
    pub options: Vec<Preset>,
}

impl Page {
    /// Options visible in the given call state, paired with their stable
    /// (unfiltered) indices.
    pub fn visible_options(&self, in_call: bool) -> Vec<(usize, &Preset)> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, preset)| preset.visible(in_call))
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("no preset at page {page}, option {option}")]
    NotFound { page: usize, option: usize },
}

/// Resolve a (page, option) pair against the registry.
pub fn lookup(pages: &[Page], page: usize, option: usize) -> Result<&Preset, PresetError> {
    pages
        .get(page)
        .and_then(|p| p.options.get(option))
        .ok_or(PresetError::NotFound { page, option })
}

/// The designated presentation-receive fallback: the last option on the
/// first page, with its option index.
pub fn receive_fallback(pages: &[Page]) -> Option<(usize, &Preset)> {
    let first = pages.first()?;
    let index = first.options.len().checked_sub(1)?;
    Some((index, &first.options[index]))
}
