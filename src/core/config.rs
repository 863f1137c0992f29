//! Configuration management
//!
//! The preset registry ships compiled into the binary (`config/default.toml`);
//! an operator can override the whole file in the platform config directory.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::presets::Page;

/// Endpoint connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint host name or address
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port of the endpoint's command channel
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    4443
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Identity of the touch-panel button this controller owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_panel_id")]
    pub panel_id: String,
    #[serde(default = "default_panel_name")]
    pub name: String,
    #[serde(default = "default_panel_color")]
    pub color: String,
    #[serde(default = "default_panel_icon")]
    pub icon: String,
}

fn default_panel_id() -> String {
    "videoPresets".to_string()
}
fn default_panel_name() -> String {
    "Video Presets".to_string()
}
fn default_panel_color() -> String {
    "#f58142".to_string()
}
fn default_panel_icon() -> String {
    "Sliders".to_string()
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            panel_id: default_panel_id(),
            name: default_panel_name(),
            color: default_panel_color(),
            icon: default_panel_icon(),
        }
    }
}

/// Sequencer timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Settle delay between device mutations, in milliseconds. The device
    /// applies layout/matrix/source changes asynchronously; issuing them
    /// back-to-back races its internal update.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_settle_ms() -> u64 {
    200
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint connection
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Panel button identity
    #[serde(default)]
    pub panel: PanelConfig,
    /// Sequencer timing
    #[serde(default)]
    pub sequencer: SequencerConfig,
    /// Preset registry: pages of options
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Config {
    /// Load configuration: the override file if present, otherwise the
    /// embedded default registry.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            toml::from_str(Self::default_config_str()).context("Failed to parse embedded config")
        }
    }

    /// Get the override configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "wxsd", "VideoPresets")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// The default configuration embedded in the binary
    pub fn default_config_str() -> &'static str {
        include_str!("../../config/default.toml")
    }
}
