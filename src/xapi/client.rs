//! High-level client for the endpoint's command surface.
//!
//! One method per device operation the controller needs; each builds its
//! request via [`commands`] and runs it through the transport. Response
//! decoding lives here so callers only see domain types.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::commands;
use super::{Transport, XRequest, XapiError};
use crate::core::events::PresentationMode;
use crate::core::presets::{
    MatrixRoute, MonitorRole, MonitorTopology, PipPosition, PresentationSlot, SelfViewSettings,
    SourceLayout,
};

/// Status subtrees the controller subscribes to at startup.
const FEEDBACK_QUERIES: &[&[&str]] = &[
    &["Status", "Video", "Layout", "CurrentLayouts", "AvailableLayouts"],
    &["Status", "Video", "ActiveSpeaker", "PIPPosition"],
    &["Status", "Video", "Selfview", "PIPPosition"],
    &["Status", "Call"],
    &["Status", "Conference", "Presentation", "Mode"],
    &["Event", "UserInterface", "Extensions", "Widget", "Action"],
];

/// One entry in the device's call list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStatus {
    pub id: String,
    pub answer_state: Option<String>,
}

impl CallStatus {
    pub fn answered(&self) -> bool {
        self.answer_state.as_deref() == Some("Answered")
    }
}

/// One custom panel known to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSummary {
    pub panel_id: String,
    pub order: Option<u32>,
}

/// Client over the device transport.
pub struct XapiClient {
    transport: Arc<dyn Transport>,
}

impl XapiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Register every feedback subscription the controller depends on.
    pub async fn subscribe_feedback(&self) -> Result<(), XapiError> {
        for query in FEEDBACK_QUERIES {
            self.transport.execute(XRequest::subscribe(query)).await?;
            debug!(?query, "feedback subscription registered");
        }
        Ok(())
    }

    /// Enumerate connected video output connectors.
    pub async fn video_outputs(&self) -> Result<Vec<u32>, XapiError> {
        let result = self.transport.execute(commands::video_outputs()).await?;
        let mut ids = Vec::new();
        for item in list_items(&result) {
            let id = item
                .get("id")
                .and_then(numeric_id)
                .ok_or_else(|| XapiError::Decode("output connector without id".to_string()))?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Current call list.
    pub async fn call_status(&self) -> Result<Vec<CallStatus>, XapiError> {
        let result = self.transport.execute(commands::call_status()).await?;
        let mut calls = Vec::new();
        for item in list_items(&result) {
            let id = item
                .get("id")
                .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_u64().map(|n| n.to_string())))
                .ok_or_else(|| XapiError::Decode("call entry without id".to_string()))?;
            calls.push(CallStatus {
                id,
                answer_state: item
                    .get("AnswerState")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
        Ok(calls)
    }

    /// Current conference presentation mode; an absent value reads as Off.
    pub async fn presentation_mode(&self) -> Result<PresentationMode, XapiError> {
        let result = self.transport.execute(commands::presentation_mode()).await?;
        match &result {
            Value::Null => Ok(PresentationMode::Off),
            Value::String(s) => PresentationMode::parse(s)
                .ok_or_else(|| XapiError::Decode(format!("unknown presentation mode {s:?}"))),
            other => Err(XapiError::Decode(format!(
                "unexpected presentation mode payload: {other}"
            ))),
        }
    }

    pub async fn set_layout(&self, layout_name: &str) -> Result<(), XapiError> {
        self.run(commands::set_layout(layout_name)).await
    }

    pub async fn set_main_video_source(
        &self,
        source_ids: &[u32],
        layout: Option<SourceLayout>,
    ) -> Result<(), XapiError> {
        self.run(commands::set_main_video_source(source_ids, layout))
            .await
    }

    pub async fn stop_presentation(&self) -> Result<(), XapiError> {
        self.run(commands::presentation_stop()).await
    }

    pub async fn start_presentation(
        &self,
        slot: &PresentationSlot,
        instance: u32,
    ) -> Result<(), XapiError> {
        self.run(commands::presentation_start(slot, instance)).await
    }

    pub async fn set_speaker_pip(&self, position: PipPosition) -> Result<(), XapiError> {
        self.run(commands::speaker_pip_set(position)).await
    }

    pub async fn set_self_view(&self, settings: &SelfViewSettings) -> Result<(), XapiError> {
        self.run(commands::selfview_set(settings)).await
    }

    pub async fn clear_self_view(&self) -> Result<(), XapiError> {
        self.run(commands::selfview_clear()).await
    }

    pub async fn set_monitor_role(
        &self,
        connector: u32,
        role: MonitorRole,
    ) -> Result<(), XapiError> {
        self.run(commands::monitor_role(connector, role)).await
    }

    pub async fn set_monitor_topology(&self, topology: MonitorTopology) -> Result<(), XapiError> {
        self.run(commands::monitor_topology(topology)).await
    }

    pub async fn assign_matrix(&self, route: &MatrixRoute) -> Result<(), XapiError> {
        self.run(commands::matrix_assign(route)).await
    }

    pub async fn reset_matrix(&self, output: u32) -> Result<(), XapiError> {
        self.run(commands::matrix_reset(output)).await
    }

    /// List existing custom panels (used to preserve panel order on save).
    pub async fn list_panels(&self) -> Result<Vec<PanelSummary>, XapiError> {
        let result = self.transport.execute(commands::panel_list()).await?;
        let Some(panels) = result.pointer("/Extensions/Panel") else {
            return Ok(Vec::new());
        };
        let mut summaries = Vec::new();
        for item in list_items(panels) {
            let Some(panel_id) = item.get("PanelId").and_then(Value::as_str) else {
                continue;
            };
            summaries.push(PanelSummary {
                panel_id: panel_id.to_string(),
                order: item.get("Order").and_then(numeric_id),
            });
        }
        Ok(summaries)
    }

    pub async fn save_panel(&self, panel_id: &str, markup: &str) -> Result<(), XapiError> {
        self.run(commands::panel_save(panel_id, markup)).await
    }

    pub async fn set_widget_value(&self, widget_id: &str, value: &str) -> Result<(), XapiError> {
        self.run(commands::widget_set_value(widget_id, value)).await
    }

    async fn run(&self, request: XRequest) -> Result<(), XapiError> {
        self.transport.execute(request).await?;
        Ok(())
    }
}

/// Status lists arrive as an array normally, a bare object when there is a
/// single entry, and null when empty.
fn list_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Numeric identifiers come back as numbers or decimal strings depending on
/// the device's software train.
fn numeric_id(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .or_else(|| value.as_str()?.parse().ok())
}
