//! Device command adapter
//!
//! Translates the controller's abstract operations into the endpoint's
//! remote API: a request/response command channel plus asynchronous
//! feedback notifications, carried as JSON-RPC over a byte stream.

pub mod client;
pub mod commands;
pub mod transport;

pub use client::{CallStatus, PanelSummary, XapiClient};
pub use commands::XRequest;
pub use transport::{JsonRpcTransport, Transport};

use thiserror::Error;

/// Errors surfaced by the device adapter.
#[derive(Debug, Error)]
pub enum XapiError {
    /// The endpoint accepted the request but rejected the operation, e.g. a
    /// layout that is not settable in the current call state.
    #[error("endpoint rejected {method}: {message} (code {code})")]
    Rejected {
        method: String,
        code: i64,
        message: String,
    },

    /// The command channel is gone; every pending request fails with this.
    #[error("transport closed")]
    TransportClosed,

    /// The endpoint answered with something we cannot interpret.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
