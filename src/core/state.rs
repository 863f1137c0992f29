//! Intended-state tracking for drift detection.

use super::presets::{PipPosition, SelfViewSettings};

/// The last values the sequencer deliberately set on the device.
///
/// Only the sequencer writes these fields, and only as part of issuing the
/// corresponding command; device reports never flow back in. That lets the
/// reconciliation listeners tell an echo of our own command ("reported value
/// equals intended") apart from an independent device action ("reported
/// value differs"), which is when the intended value gets re-asserted.
///
/// Cleared only at process restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedState {
    /// Last composed layout the sequencer set, by name.
    pub current_layout: Option<String>,
    /// Last self-view settings the sequencer applied; `None` after an
    /// explicit clear.
    pub current_self_view: Option<SelfViewSettings>,
    /// Last active-speaker PIP position the sequencer set.
    pub speaker_pip: Option<PipPosition>,
}

impl AppliedState {
    /// Intended self-view PIP position, if a self-view with a position is
    /// currently intended.
    pub fn self_view_pip(&self) -> Option<PipPosition> {
        self.current_self_view.as_ref()?.pip_position
    }
}
