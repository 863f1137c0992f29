//! Reconciliation loop behavior: widget presses, call lifecycle panel
//! rebuilds, and the presentation-receive fallback.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use video_presets::core::events::{EndpointEvent, PresentationMode};
use video_presets::{PresetSequencer, Reconciler, XapiClient};

use crate::support::{config_with_options, empty_preset, RecordingTransport};

const LAYOUT: &str = "xCommand/Video/Layout/SetLayout";
const PANEL_LIST: &str = "xCommand/UserInterface/Extensions/List";
const PANEL_SAVE: &str = "xCommand/UserInterface/Extensions/Panel/Save";
const WIDGET_SET: &str = "xCommand/UserInterface/Extensions/Widget/SetValue";

fn reconciler_fixture(
    options: Vec<video_presets::Preset>,
) -> (Arc<RecordingTransport>, Reconciler) {
    let transport = RecordingTransport::new();
    let client = Arc::new(XapiClient::new(transport.clone()));
    let sequencer = Arc::new(PresetSequencer::new(
        Arc::clone(&client),
        vec![1],
        Duration::ZERO,
    ));
    let config = config_with_options(options);
    let reconciler = Reconciler::new(client, sequencer, config, false, PresentationMode::Off);
    (transport, reconciler)
}

fn layout_preset(name: &str, layout: &str) -> video_presets::Preset {
    let mut preset = empty_preset(name);
    preset.layout_name = Some(layout.to_string());
    preset
}

#[tokio::test]
async fn test_widget_press_applies_matching_preset() {
    let (transport, mut reconciler) = reconciler_fixture(vec![
        layout_preset("A", "Grid"),
        layout_preset("B", "Focus"),
    ]);

    reconciler
        .handle_event(EndpointEvent::WidgetAction {
            widget_id: "videoPresets-0".to_string(),
            value: "1".to_string(),
            action: "pressed".to_string(),
        })
        .await;

    let layout = transport
        .requests()
        .into_iter()
        .find(|r| r.method == LAYOUT)
        .unwrap();
    assert_eq!(layout.params, json!({ "LayoutName": "Focus" }));
}

#[tokio::test]
async fn test_widget_release_is_ignored() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::WidgetAction {
            widget_id: "videoPresets-0".to_string(),
            value: "0".to_string(),
            action: "released".to_string(),
        })
        .await;
    assert!(transport.methods().is_empty());
}

#[tokio::test]
async fn test_foreign_widget_is_ignored() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::WidgetAction {
            widget_id: "otherPanel-0".to_string(),
            value: "0".to_string(),
            action: "pressed".to_string(),
        })
        .await;
    assert!(transport.methods().is_empty());
}

#[tokio::test]
async fn test_bad_option_index_issues_no_commands() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::WidgetAction {
            widget_id: "videoPresets-0".to_string(),
            value: "7".to_string(),
            action: "pressed".to_string(),
        })
        .await;
    assert!(transport.methods().is_empty());
}

#[tokio::test]
async fn test_call_connect_and_end_rebuild_panel() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("17".to_string()),
            answer_state: Some("Answered".to_string()),
            ghost: false,
        })
        .await;
    assert!(reconciler.in_call());
    assert_eq!(transport.methods(), vec![PANEL_LIST, PANEL_SAVE]);

    // A repeated report for the same call does not rebuild again.
    transport.clear();
    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("17".to_string()),
            answer_state: Some("Answered".to_string()),
            ghost: false,
        })
        .await;
    assert!(transport.methods().is_empty());

    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("17".to_string()),
            answer_state: None,
            ghost: true,
        })
        .await;
    assert!(!reconciler.in_call());
    assert_eq!(transport.methods(), vec![PANEL_LIST, PANEL_SAVE]);
}

#[tokio::test]
async fn test_ghost_of_other_call_keeps_tracked_call() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("17".to_string()),
            answer_state: Some("Answered".to_string()),
            ghost: false,
        })
        .await;
    transport.clear();

    // A second incoming call is declined while "17" is still up; its ghost
    // must not end the tracked call or republish the panel.
    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("99".to_string()),
            answer_state: None,
            ghost: true,
        })
        .await;
    assert!(reconciler.in_call());
    assert!(transport.methods().is_empty());

    // The tracked call's own ghost still ends it.
    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("17".to_string()),
            answer_state: None,
            ghost: true,
        })
        .await;
    assert!(!reconciler.in_call());
    assert_eq!(transport.methods(), vec![PANEL_LIST, PANEL_SAVE]);
}

#[tokio::test]
async fn test_ghost_without_id_ends_tracked_call() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("17".to_string()),
            answer_state: Some("Answered".to_string()),
            ghost: false,
        })
        .await;
    transport.clear();

    reconciler
        .handle_event(EndpointEvent::Call {
            id: None,
            answer_state: None,
            ghost: true,
        })
        .await;
    assert!(!reconciler.in_call());
    assert_eq!(transport.methods(), vec![PANEL_LIST, PANEL_SAVE]);
}

#[tokio::test]
async fn test_ghost_without_tracked_call_is_ignored() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::Call {
            id: Some("3".to_string()),
            answer_state: None,
            ghost: true,
        })
        .await;
    assert!(transport.methods().is_empty());
}

#[tokio::test]
async fn test_presentation_receive_applies_last_option_and_syncs_widget() {
    let (transport, mut reconciler) = reconciler_fixture(vec![
        layout_preset("A", "Grid"),
        layout_preset("B", "Focus"),
        layout_preset("Receive fallback", "Floating"),
    ]);

    reconciler
        .handle_event(EndpointEvent::PresentationMode(PresentationMode::Receiving))
        .await;

    let requests = transport.requests();
    let layout = requests.iter().find(|r| r.method == LAYOUT).unwrap();
    assert_eq!(layout.params, json!({ "LayoutName": "Floating" }));

    let widget = requests.iter().find(|r| r.method == WIDGET_SET).unwrap();
    assert_eq!(
        widget.params,
        json!({ "WidgetId": "videoPresets-0", "Value": "2" })
    );
}

#[tokio::test]
async fn test_presentation_receive_fires_on_edge_only() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    reconciler
        .handle_event(EndpointEvent::PresentationMode(PresentationMode::Receiving))
        .await;
    assert!(!transport.methods().is_empty());

    // Repeated Receiving reports do not re-apply the fallback.
    transport.clear();
    reconciler
        .handle_event(EndpointEvent::PresentationMode(PresentationMode::Receiving))
        .await;
    assert!(transport.methods().is_empty());

    // Going away and back does.
    reconciler
        .handle_event(EndpointEvent::PresentationMode(PresentationMode::Off))
        .await;
    reconciler
        .handle_event(EndpointEvent::PresentationMode(PresentationMode::Receiving))
        .await;
    assert!(!transport.methods().is_empty());
}

#[tokio::test]
async fn test_drift_events_route_to_sequencer() {
    let (transport, mut reconciler) = reconciler_fixture(vec![layout_preset("A", "Grid")]);

    // Apply option 0 so a layout intent exists.
    reconciler
        .handle_event(EndpointEvent::WidgetAction {
            widget_id: "videoPresets-0".to_string(),
            value: "0".to_string(),
            action: "pressed".to_string(),
        })
        .await;
    transport.clear();

    reconciler
        .handle_event(EndpointEvent::LayoutChanged {
            name: Some("Overlay".to_string()),
            ghost: false,
        })
        .await;
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].params, json!({ "LayoutName": "Grid" }));
}
