//! Preset sequencer
//!
//! Drives the endpoint into matching a declarative [`Preset`] as an
//! ordered, settle-delay-separated sequence of device mutations, and owns
//! the intended state used by the reconciliation listeners to tell echoes
//! of its own commands apart from independent device drift.

pub mod reconcile;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::core::presets::{PipPosition, Preset};
use crate::core::state::AppliedState;
use crate::xapi::{XapiClient, XapiError};

/// Named pipeline stages, in their fixed execution order. The order is a
/// contract: the device races when layout/matrix/source changes arrive
/// back-to-back, and explicit matrix routes must be cleared before anything
/// that re-composes outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResetMatrix,
    AssignMatrix,
    MonitorRoles,
    MonitorTopology,
    Layout,
    MainSource,
    Presentations,
    SpeakerPip,
    SelfView,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResetMatrix => "reset-matrix",
            Stage::AssignMatrix => "assign-matrix",
            Stage::MonitorRoles => "monitor-roles",
            Stage::MonitorTopology => "monitor-topology",
            Stage::Layout => "layout",
            Stage::MainSource => "main-source",
            Stage::Presentations => "presentations",
            Stage::SpeakerPip => "speaker-pip",
            Stage::SelfView => "self-view",
        };
        f.write_str(name)
    }
}

/// Applies presets to the endpoint and re-asserts them against drift.
pub struct PresetSequencer {
    client: Arc<XapiClient>,
    /// Output connectors reported by the device at startup; matrix resets
    /// cover all of them.
    outputs: Vec<u32>,
    /// Delay between mutations, giving the device time to settle.
    settle: Duration,
    applied: Mutex<AppliedState>,
}

impl PresetSequencer {
    pub fn new(client: Arc<XapiClient>, outputs: Vec<u32>, settle: Duration) -> Self {
        Self {
            client,
            outputs,
            settle,
            applied: Mutex::new(AppliedState::default()),
        }
    }

    /// Snapshot of the currently intended state.
    pub fn applied(&self) -> AppliedState {
        self.applied.lock().clone()
    }

    /// Apply every field the preset carries, in the fixed stage order.
    ///
    /// Absent fields are no-ops that do not reorder the remaining stages;
    /// the one exception is self-view, which always runs last and clears
    /// the overlay when the preset omits it. Individual command failures
    /// are logged and the sequence continues; the application is
    /// best-effort, not transactional.
    pub async fn apply_preset(&self, preset: &Preset) {
        info!(preset = %preset.name, "applying preset");

        // Stale explicit routes from a previous preset must never linger,
        // so the reset runs unconditionally and first.
        for output in &self.outputs {
            log_stage(Stage::ResetMatrix, self.client.reset_matrix(*output).await);
            self.settle().await;
        }

        // Matrix assignment is not atomic across outputs; route one at a
        // time and let each settle.
        for route in &preset.video_matrix {
            log_stage(Stage::AssignMatrix, self.client.assign_matrix(route).await);
            self.settle().await;
        }

        // The role configuration is per-connector, not bulk; index i maps
        // to connector i+1.
        for (i, role) in preset.monitor_roles.iter().enumerate() {
            log_stage(
                Stage::MonitorRoles,
                self.client.set_monitor_role(i as u32 + 1, *role).await,
            );
            self.settle().await;
        }

        if let Some(topology) = preset.video_monitors {
            log_stage(
                Stage::MonitorTopology,
                self.client.set_monitor_topology(topology).await,
            );
            self.settle().await;
        }

        if let Some(layout_name) = &preset.layout_name {
            // Record the intent first so a near-simultaneous device echo is
            // recognized as our own doing.
            self.applied.lock().current_layout = Some(layout_name.clone());
            log_stage(Stage::Layout, self.client.set_layout(layout_name).await);
            self.settle().await;
        }

        if let Some(source) = &preset.main_video_source {
            log_stage(
                Stage::MainSource,
                self.client
                    .set_main_video_source(&source.source_ids, source.layout)
                    .await,
            );
            self.settle().await;
        }

        if !preset.presentations.is_empty() {
            log_stage(Stage::Presentations, self.client.stop_presentation().await);
            self.settle().await;
            for (i, slot) in preset.presentations.iter().enumerate() {
                log_stage(
                    Stage::Presentations,
                    self.client.start_presentation(slot, i as u32 + 1).await,
                );
                self.settle().await;
            }
        }

        if let Some(position) = preset.speaker_pip_position {
            self.applied.lock().speaker_pip = Some(position);
            log_stage(
                Stage::SpeakerPip,
                self.client.set_speaker_pip(position).await,
            );
            self.settle().await;
        }

        // Always last: self-view either takes the preset's settings or is
        // cleared outright.
        self.applied.lock().current_self_view = preset.self_view.clone();
        let result = match &preset.self_view {
            Some(settings) => self.client.set_self_view(settings).await,
            None => self.client.clear_self_view().await,
        };
        log_stage(Stage::SelfView, result);

        debug!(preset = %preset.name, "preset applied");
    }

    /// Re-issue the intended layout when the device reports a differing
    /// one. Ghost reports and reports preceding the first applied preset
    /// are ignored.
    pub async fn reassert_layout(&self, reported: Option<&str>, ghost: bool) {
        if ghost {
            return;
        }
        let intended = {
            let applied = self.applied.lock();
            match (&applied.current_layout, reported) {
                (Some(intended), Some(name)) if intended.as_str() != name => intended.clone(),
                _ => return,
            }
        };
        info!(layout = %intended, reported = ?reported, "layout drifted, re-asserting");
        if let Err(err) = self.client.set_layout(&intended).await {
            warn!(layout = %intended, "failed to re-assert layout: {}", err);
        }
    }

    /// Re-issue the intended active-speaker PIP position on drift.
    pub async fn reassert_speaker_pip(&self, reported: PipPosition) {
        let intended = {
            let applied = self.applied.lock();
            match applied.speaker_pip {
                Some(intended) if intended != reported => intended,
                _ => return,
            }
        };
        info!(position = intended.as_str(), "speaker PIP drifted, re-asserting");
        if let Err(err) = self.client.set_speaker_pip(intended).await {
            warn!("failed to re-assert speaker PIP: {}", err);
        }
    }

    /// Re-apply the full intended self-view when its PIP position drifts.
    /// The whole settings bundle goes out again, not just the position, in
    /// case the device reset more than it reported.
    pub async fn reapply_self_view(&self, reported: PipPosition) {
        let settings = {
            let applied = self.applied.lock();
            match (applied.current_self_view.clone(), applied.self_view_pip()) {
                (Some(settings), Some(intended)) if intended != reported => settings,
                _ => return,
            }
        };
        info!("self-view PIP drifted, re-applying self-view");
        if let Err(err) = self.client.set_self_view(&settings).await {
            warn!("failed to re-apply self-view: {}", err);
        }
    }

    async fn settle(&self) {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
    }
}

fn log_stage(stage: Stage, result: Result<(), XapiError>) {
    if let Err(err) = result {
        warn!(%stage, "device command failed, continuing: {}", err);
    }
}
