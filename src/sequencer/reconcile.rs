//! Reconciliation listeners
//!
//! Consumes the endpoint's feedback events on the single event loop and
//! keeps the applied state dominant over the device's own heuristics:
//! drift reports trigger re-assertion through the sequencer, call
//! transitions rebuild the panel's call-state filter, and a
//! presentation-receive transition applies the designated fallback preset.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::PresetSequencer;
use crate::core::config::Config;
use crate::core::events::{EndpointEvent, PresentationMode};
use crate::core::presets;
use crate::panel;
use crate::xapi::XapiClient;

/// Event dispatcher for the controller's main loop.
pub struct Reconciler {
    client: Arc<XapiClient>,
    sequencer: Arc<PresetSequencer>,
    config: Arc<Config>,
    /// Whether the endpoint currently has an answered call.
    in_call: bool,
    /// Id of the call being tracked, to dedupe repeated status reports.
    active_call: Option<String>,
    /// Last seen presentation mode, for edge detection on Receiving.
    presentation_mode: PresentationMode,
}

impl Reconciler {
    pub fn new(
        client: Arc<XapiClient>,
        sequencer: Arc<PresetSequencer>,
        config: Arc<Config>,
        in_call: bool,
        presentation_mode: PresentationMode,
    ) -> Self {
        Self {
            client,
            sequencer,
            config,
            in_call,
            active_call: None,
            presentation_mode,
        }
    }

    pub fn in_call(&self) -> bool {
        self.in_call
    }

    pub async fn handle_event(&mut self, event: EndpointEvent) {
        debug!(?event, "endpoint event");
        match event {
            EndpointEvent::LayoutChanged { name, ghost } => {
                self.sequencer.reassert_layout(name.as_deref(), ghost).await;
            }
            EndpointEvent::SpeakerPipMoved(position) => {
                self.sequencer.reassert_speaker_pip(position).await;
            }
            EndpointEvent::SelfViewPipMoved(position) => {
                self.sequencer.reapply_self_view(position).await;
            }
            EndpointEvent::Call {
                id,
                answer_state,
                ghost,
            } => {
                self.handle_call(id, answer_state, ghost).await;
            }
            EndpointEvent::PresentationMode(mode) => {
                self.handle_presentation_mode(mode).await;
            }
            EndpointEvent::WidgetAction {
                widget_id,
                value,
                action,
            } => {
                self.handle_widget_action(&widget_id, &value, &action).await;
            }
        }
    }

    async fn handle_call(
        &mut self,
        id: Option<String>,
        answer_state: Option<String>,
        ghost: bool,
    ) {
        if answer_state.as_deref() == Some("Answered") && id != self.active_call {
            info!(call = ?id, "call connected");
            self.active_call = id;
            self.in_call = true;
            self.rebuild_panel().await;
        } else if ghost
            && self.active_call.is_some()
            && (id.is_none() || id == self.active_call)
        {
            info!(call = ?self.active_call, "call ended");
            self.active_call = None;
            self.in_call = false;
            self.rebuild_panel().await;
        }
    }

    /// The device switching to receiving a far-end presentation is treated
    /// as an implicit operator action: the last option on the first page is
    /// the designated fallback for it. Fires on the transition edge only.
    async fn handle_presentation_mode(&mut self, mode: PresentationMode) {
        let previous = std::mem::replace(&mut self.presentation_mode, mode);
        if mode != PresentationMode::Receiving || previous == PresentationMode::Receiving {
            return;
        }

        let Some((index, preset)) = presets::receive_fallback(&self.config.pages) else {
            warn!("presentation receiving but the registry has no fallback preset");
            return;
        };
        let preset = preset.clone();
        info!(preset = %preset.name, "presentation receiving, applying fallback preset");
        self.sequencer.apply_preset(&preset).await;

        // Keep the panel's selected value in sync with the auto-applied
        // option.
        let widget_id = panel::widget_id(&self.config.panel.panel_id, 0);
        if let Err(err) = self
            .client
            .set_widget_value(&widget_id, &index.to_string())
            .await
        {
            warn!(widget = %widget_id, "failed to update widget value: {}", err);
        }
    }

    async fn handle_widget_action(&mut self, widget_id: &str, value: &str, action: &str) {
        if action != "pressed" {
            return;
        }
        let Some(page) = panel::parse_widget_id(&self.config.panel.panel_id, widget_id) else {
            return;
        };
        let Ok(option) = value.parse::<usize>() else {
            warn!(widget = widget_id, value, "widget value is not an option index");
            return;
        };

        match presets::lookup(&self.config.pages, page, option) {
            Ok(preset) => {
                let preset = preset.clone();
                self.sequencer.apply_preset(&preset).await;
            }
            Err(err) => warn!("{}", err),
        }
    }

    async fn rebuild_panel(&self) {
        if let Err(err) = panel::sync_panel(
            &self.client,
            &self.config.panel,
            &self.config.pages,
            self.in_call,
        )
        .await
        {
            warn!("panel rebuild failed: {}", err);
        }
    }
}
