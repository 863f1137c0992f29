//! Command channel to the endpoint.
//!
//! Requests and responses are newline-delimited JSON-RPC 2.0 frames over
//! any byte stream (plain TCP in production; a duplex pipe in tests). The
//! endpoint pushes feedback notifications on the same stream; the reader
//! task routes responses to their waiting callers by id and turns feedback
//! frames into [`EndpointEvent`]s on an unbounded channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{XRequest, XapiError};
use crate::core::events::EndpointEvent;

/// The request/response seam the rest of the crate talks through. Tests
/// substitute a recording fake here.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request and wait for the endpoint's response payload.
    async fn execute(&self, request: XRequest) -> Result<Value, XapiError>;
}

struct PendingRequest {
    method: String,
    tx: oneshot::Sender<Result<Value, XapiError>>,
}

type PendingMap = Arc<Mutex<HashMap<u64, PendingRequest>>>;

/// JSON-RPC transport over a byte stream.
pub struct JsonRpcTransport {
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: PendingMap,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    /// Take ownership of the stream, spawn the reader task, and hand back
    /// the transport plus the feedback event channel.
    pub fn start<S>(stream: S) -> (Self, mpsc::UnboundedReceiver<EndpointEvent>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(read_loop(read_half, Arc::clone(&pending), event_tx));

        let transport = Self {
            writer: tokio::sync::Mutex::new(Box::new(write_half)),
            pending,
            next_id: AtomicU64::new(1),
        };
        (transport, event_rx)
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn execute(&self, request: XRequest) -> Result<Value, XapiError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(
            id,
            PendingRequest {
                method: request.method.clone(),
                tx,
            },
        );

        let frame = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": request.method,
            "params": request.params,
        })
        .to_string();
        debug!(%frame, "sending request");

        let write_result = {
            let mut writer = self.writer.lock().await;
            async {
                writer.write_all(frame.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await
            }
            .await
        };
        if let Err(err) = write_result {
            self.pending.lock().remove(&id);
            return Err(XapiError::Io(err));
        }

        // The reader task drops the sender only if the stream closes first.
        rx.await.map_err(|_| XapiError::TransportClosed)?
    }
}

async fn read_loop<R>(
    reader: R,
    pending: PendingMap,
    events: mpsc::UnboundedSender<EndpointEvent>,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!("read error on endpoint stream: {}", err);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let message: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                warn!("unparseable frame from endpoint: {}", err);
                continue;
            }
        };

        if let Some(id) = message.get("id").and_then(Value::as_u64) {
            let Some(request) = pending.lock().remove(&id) else {
                debug!(id, "response for unknown request id");
                continue;
            };
            let result = match message.get("error") {
                Some(error) => Err(XapiError::Rejected {
                    method: request.method,
                    code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                }),
                None => Ok(message.get("result").cloned().unwrap_or(Value::Null)),
            };
            let _ = request.tx.send(result);
        } else if message.get("method").and_then(Value::as_str) == Some("xFeedback/Event") {
            let Some(params) = message.get("params") else {
                continue;
            };
            for event in EndpointEvent::parse_feedback(params) {
                if events.send(event).is_err() {
                    // Nobody is listening anymore; keep draining responses.
                    break;
                }
            }
        } else {
            debug!("ignoring frame without id or feedback method");
        }
    }

    info!("endpoint stream closed");
    for (_, request) in pending.lock().drain() {
        let _ = request.tx.send(Err(XapiError::TransportClosed));
    }
}
