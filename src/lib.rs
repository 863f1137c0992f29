//! Video Presets Controller
//!
//! A companion process that lets an operator apply named video presets
//! (camera layout, self-view, presentation routing, monitor roles, matrix
//! routes) to a conferencing endpoint from a touch panel rendered on the
//! endpoint itself.
//!
//! # Features
//! - Builds and saves the touch-panel button page from the preset registry
//! - Applies a selected preset as an ordered, settle-separated command
//!   sequence
//! - Tracks the intended layout/self-view/PIP state and re-asserts it when
//!   the device drifts
//! - Rebuilds the panel on call start/end so in-call-only options appear
//!   and disappear
//! - Applies a designated fallback preset when the endpoint starts
//!   receiving a far-end presentation

pub mod core;
pub mod panel;
pub mod sequencer;
pub mod xapi;

pub use crate::core::config::Config;
pub use crate::core::events::{EndpointEvent, PresentationMode};
pub use crate::core::presets::{Page, Preset, PresetError};
pub use crate::core::state::AppliedState;
pub use crate::sequencer::reconcile::Reconciler;
pub use crate::sequencer::PresetSequencer;
pub use crate::xapi::{JsonRpcTransport, XapiClient, XapiError};
