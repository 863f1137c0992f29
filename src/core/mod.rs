//! Core module - preset registry, configuration, events, and intended state

pub mod config;
pub mod events;
pub mod presets;
pub mod state;
