//! Request builders
//!
//! Convenience functions for building endpoint requests. Each device
//! operation maps to one `XRequest`; builders are pure and unit-tested so
//! the wire shape of every command is pinned down in one place.

use serde_json::{json, Map, Value};

use crate::core::presets::{
    MatrixRoute, MonitorRole, MonitorTopology, PipPosition, PresentationSlot, SelfViewSettings,
    SourceLayout,
};

/// One request to the endpoint: a method path and a JSON parameter object.
#[derive(Debug, Clone, PartialEq)]
pub struct XRequest {
    /// Slash-separated method, e.g. `xCommand/Video/Layout/SetLayout`.
    pub method: String,
    pub params: Value,
}

impl XRequest {
    pub fn command(path: &str, params: Value) -> Self {
        Self {
            method: format!("xCommand/{path}"),
            params,
        }
    }

    /// Read a status subtree.
    pub fn get(path: &[&str]) -> Self {
        Self {
            method: "xGet".to_string(),
            params: json!({ "Path": path }),
        }
    }

    /// Write one configuration node.
    pub fn set(path: Value, value: Value) -> Self {
        Self {
            method: "xSet".to_string(),
            params: json!({ "Path": path, "Value": value }),
        }
    }

    /// Register a feedback subscription for a status/event subtree.
    pub fn subscribe(query: &[&str]) -> Self {
        Self {
            method: "xFeedback/Subscribe".to_string(),
            params: json!({ "Query": query }),
        }
    }
}

/// Build a set-layout command.
pub fn set_layout(layout_name: &str) -> XRequest {
    XRequest::command(
        "Video/Layout/SetLayout",
        json!({ "LayoutName": layout_name }),
    )
}

/// Build a main-video-source command from source ids and composition mode.
pub fn set_main_video_source(source_ids: &[u32], layout: Option<SourceLayout>) -> XRequest {
    let mut params = Map::new();
    params.insert("SourceId".to_string(), json!(source_ids));
    if let Some(layout) = layout {
        params.insert("Layout".to_string(), json!(layout.as_str()));
    }
    XRequest::command("Video/Input/SetMainVideoSource", Value::Object(params))
}

/// Build a stop-presentation command (stops every running instance).
pub fn presentation_stop() -> XRequest {
    XRequest::command("Presentation/Stop", json!({}))
}

/// Build a start-presentation command for one slot with its 1-based instance
/// number.
pub fn presentation_start(slot: &PresentationSlot, instance: u32) -> XRequest {
    let mut params = Map::new();
    params.insert("PresentationSource".to_string(), json!(slot.source_ids));
    params.insert(
        "SendingMode".to_string(),
        json!(slot.sending_mode.as_str()),
    );
    params.insert("Instance".to_string(), json!(instance));
    if let Some(layout) = slot.layout {
        params.insert("Layout".to_string(), json!(layout.as_str()));
    }
    XRequest::command("Presentation/Start", Value::Object(params))
}

/// Build a self-view set command; only the fields present in the settings
/// appear in the request.
pub fn selfview_set(settings: &SelfViewSettings) -> XRequest {
    let mut params = Map::new();
    if let Some(mode) = settings.mode {
        params.insert("Mode".to_string(), json!(mode.as_str()));
    }
    if let Some(fullscreen) = settings.fullscreen_mode {
        params.insert("FullscreenMode".to_string(), json!(fullscreen.as_str()));
    }
    if let Some(role) = settings.on_monitor_role {
        params.insert("OnMonitorRole".to_string(), json!(role.as_str()));
    }
    if let Some(position) = settings.pip_position {
        params.insert("PIPPosition".to_string(), json!(position.as_str()));
    }
    XRequest::command("Video/Selfview/Set", Value::Object(params))
}

/// Build an active-speaker PIP position command.
pub fn speaker_pip_set(position: PipPosition) -> XRequest {
    XRequest::command(
        "Video/ActiveSpeakerPIP/Set",
        json!({ "Position": position.as_str() }),
    )
}

/// Build a self-view clear (Mode Off).
pub fn selfview_clear() -> XRequest {
    XRequest::command("Video/Selfview/Set", json!({ "Mode": "Off" }))
}

/// Build a per-connector monitor role configuration write.
pub fn monitor_role(connector: u32, role: MonitorRole) -> XRequest {
    XRequest::set(
        json!(["Configuration", "Video", "Output", "Connector", connector, "MonitorRole"]),
        json!(role.as_str()),
    )
}

/// Build the monitor topology configuration write.
pub fn monitor_topology(topology: MonitorTopology) -> XRequest {
    XRequest::set(
        json!(["Configuration", "Video", "Monitors"]),
        json!(topology.as_str()),
    )
}

/// Build a matrix route assignment.
pub fn matrix_assign(route: &MatrixRoute) -> XRequest {
    let mut params = Map::new();
    params.insert("Output".to_string(), json!(route.output));
    params.insert("SourceId".to_string(), json!(route.source_id));
    if let Some(layout) = route.layout {
        params.insert("Layout".to_string(), json!(layout.as_str()));
    }
    XRequest::command("Video/Matrix/Assign", Value::Object(params))
}

/// Build a matrix reset for one output connector.
pub fn matrix_reset(output: u32) -> XRequest {
    XRequest::command("Video/Matrix/Reset", json!({ "Output": output }))
}

/// Build the connected-outputs status query.
pub fn video_outputs() -> XRequest {
    XRequest::get(&["Status", "Video", "Output", "Connector"])
}

/// Build the call list status query.
pub fn call_status() -> XRequest {
    XRequest::get(&["Status", "Call"])
}

/// Build the conference presentation mode status query.
pub fn presentation_mode() -> XRequest {
    XRequest::get(&["Status", "Conference", "Presentation", "Mode"])
}

/// Build the custom panel list query (used to preserve panel order).
pub fn panel_list() -> XRequest {
    XRequest::command(
        "UserInterface/Extensions/List",
        json!({ "ActivityType": "Custom" }),
    )
}

/// Build a panel save with its XML body.
pub fn panel_save(panel_id: &str, markup: &str) -> XRequest {
    XRequest::command(
        "UserInterface/Extensions/Panel/Save",
        json!({ "PanelId": panel_id, "body": markup }),
    )
}

/// Build a widget value update.
pub fn widget_set_value(widget_id: &str, value: &str) -> XRequest {
    XRequest::command(
        "UserInterface/Extensions/Widget/SetValue",
        json!({ "WidgetId": widget_id, "Value": value }),
    )
}
