//! Endpoint event definitions
//!
//! Feedback notifications from the device arrive as nested JSON mirroring
//! the status/event tree the subscription was registered against. This
//! module flattens the subtrees we subscribe to into one event enum that
//! the reconciliation loop can match on.

use serde_json::Value;

use super::presets::PipPosition;

/// Conference presentation mode as reported by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    Off,
    Sending,
    Receiving,
}

impl PresentationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Off" => Some(PresentationMode::Off),
            "Sending" => Some(PresentationMode::Sending),
            "Receiving" => Some(PresentationMode::Receiving),
            _ => None,
        }
    }
}

/// Asynchronous reports from the endpoint that the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointEvent {
    /// The device's composed layout changed (or a layout entry vanished,
    /// flagged as a ghost report).
    LayoutChanged { name: Option<String>, ghost: bool },

    /// Active-speaker PIP moved.
    SpeakerPipMoved(PipPosition),

    /// Self-view PIP moved.
    SelfViewPipMoved(PipPosition),

    /// Call status entry changed. Ghost reports mark a call that ended.
    Call {
        id: Option<String>,
        answer_state: Option<String>,
        ghost: bool,
    },

    /// Conference presentation mode changed.
    PresentationMode(PresentationMode),

    /// Touch-panel widget interaction.
    WidgetAction {
        widget_id: String,
        value: String,
        action: String,
    },
}

impl EndpointEvent {
    /// Translate one feedback notification payload into events.
    ///
    /// A payload normally carries a single subtree, but call status arrives
    /// as a list, so this returns every event found. Unrecognized payloads
    /// produce an empty vec.
    pub fn parse_feedback(payload: &Value) -> Vec<EndpointEvent> {
        let mut events = Vec::new();

        if let Some(layout) = dig(
            payload,
            &["Status", "Video", "Layout", "CurrentLayouts", "AvailableLayouts"],
        ) {
            for item in as_items(layout) {
                events.push(EndpointEvent::LayoutChanged {
                    name: str_field(item, "LayoutName"),
                    ghost: ghost_flag(item),
                });
            }
        }

        if let Some(pos) = dig(payload, &["Status", "Video", "ActiveSpeaker", "PIPPosition"])
            .and_then(Value::as_str)
            .and_then(PipPosition::parse)
        {
            events.push(EndpointEvent::SpeakerPipMoved(pos));
        }

        if let Some(pos) = dig(payload, &["Status", "Video", "Selfview", "PIPPosition"])
            .and_then(Value::as_str)
            .and_then(PipPosition::parse)
        {
            events.push(EndpointEvent::SelfViewPipMoved(pos));
        }

        if let Some(calls) = dig(payload, &["Status", "Call"]) {
            for call in as_items(calls) {
                events.push(EndpointEvent::Call {
                    id: str_field(call, "id"),
                    answer_state: str_field(call, "AnswerState"),
                    ghost: ghost_flag(call),
                });
            }
        }

        if let Some(mode) = dig(payload, &["Status", "Conference", "Presentation", "Mode"])
            .and_then(Value::as_str)
            .and_then(PresentationMode::parse)
        {
            events.push(EndpointEvent::PresentationMode(mode));
        }

        if let Some(action) = dig(
            payload,
            &["Event", "UserInterface", "Extensions", "Widget", "Action"],
        ) {
            if let (Some(widget_id), Some(value), Some(kind)) = (
                str_field(action, "WidgetId"),
                str_field(action, "Value"),
                str_field(action, "Type"),
            ) {
                events.push(EndpointEvent::WidgetAction {
                    widget_id,
                    value,
                    action: kind,
                });
            }
        }

        events
    }
}

fn dig<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

/// Status subtrees are a single object for scalar paths and an array for
/// list paths; normalize to an iterator over items either way.
fn as_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// The device marks removed entries with a `ghost` member, sent either as a
/// JSON bool or the string "True".
fn ghost_flag(value: &Value) -> bool {
    match value.get("ghost") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "True",
        _ => false,
    }
}
