//! Shared test plumbing: a transport fake that records every request and
//! answers from a canned per-method map, plus preset fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use video_presets::core::presets::{
    MainVideoSource, MatrixRoute, MonitorRole, MonitorTopology, OnOff, Page, PipPosition, Preset,
    PresentationSlot, SelfViewSettings, SendingMode, SourceLayout,
};
use video_presets::xapi::{Transport, XRequest, XapiClient, XapiError};
use video_presets::{Config, PresetSequencer};

pub struct RecordingTransport {
    requests: Mutex<Vec<XRequest>>,
    responses: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        })
    }

    /// Canned response for a method; anything unlisted answers null.
    pub fn respond(&self, method: &str, value: Value) {
        self.responses.lock().insert(method.to_string(), value);
    }

    /// Make every request for a method fail as device-rejected.
    pub fn fail(&self, method: &str) {
        self.failing.lock().insert(method.to_string());
    }

    pub fn requests(&self) -> Vec<XRequest> {
        self.requests.lock().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.method.clone()).collect()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: XRequest) -> Result<Value, XapiError> {
        let method = request.method.clone();
        self.requests.lock().push(request);
        if self.failing.lock().contains(&method) {
            return Err(XapiError::Rejected {
                method,
                code: 1,
                message: "rejected by test".to_string(),
            });
        }
        Ok(self.responses.lock().get(&method).cloned().unwrap_or(Value::Null))
    }
}

/// Client + sequencer over a fresh recording transport, with outputs 1 and 2
/// known and a zero settle delay.
pub fn sequencer_fixture() -> (Arc<RecordingTransport>, Arc<XapiClient>, PresetSequencer) {
    let transport = RecordingTransport::new();
    let client = Arc::new(XapiClient::new(transport.clone()));
    let sequencer = PresetSequencer::new(Arc::clone(&client), vec![1, 2], Duration::ZERO);
    (transport, client, sequencer)
}

pub fn empty_preset(name: &str) -> Preset {
    Preset {
        name: name.to_string(),
        in_call: None,
        self_view: None,
        main_video_source: None,
        layout_name: None,
        presentations: Vec::new(),
        monitor_roles: Vec::new(),
        video_monitors: None,
        video_matrix: Vec::new(),
        speaker_pip_position: None,
    }
}

/// A preset exercising every stage.
pub fn full_preset() -> Preset {
    Preset {
        name: "Everything".to_string(),
        in_call: None,
        self_view: Some(SelfViewSettings {
            mode: Some(OnOff::On),
            fullscreen_mode: Some(OnOff::Off),
            on_monitor_role: Some(MonitorRole::First),
            pip_position: Some(PipPosition::LowerLeft),
        }),
        main_video_source: Some(MainVideoSource {
            source_ids: vec![1, 2],
            layout: Some(SourceLayout::Equal),
        }),
        layout_name: Some("Floating".to_string()),
        presentations: vec![
            PresentationSlot {
                source_ids: vec![2],
                layout: Some(SourceLayout::Equal),
                sending_mode: SendingMode::LocalRemote,
            },
            PresentationSlot {
                source_ids: vec![3],
                layout: Some(SourceLayout::Equal),
                sending_mode: SendingMode::LocalOnly,
            },
        ],
        monitor_roles: vec![MonitorRole::First, MonitorRole::Second],
        video_monitors: Some(MonitorTopology::Dual),
        video_matrix: vec![
            MatrixRoute {
                output: 1,
                source_id: 2,
                layout: None,
            },
            MatrixRoute {
                output: 2,
                source_id: 3,
                layout: None,
            },
        ],
        speaker_pip_position: Some(PipPosition::UpperRight),
    }
}

/// A config whose registry is a single page of the given presets.
pub fn config_with_options(options: Vec<Preset>) -> Arc<Config> {
    Arc::new(Config {
        pages: vec![Page {
            name: "Video Presets".to_string(),
            options,
        }],
        ..Default::default()
    })
}
