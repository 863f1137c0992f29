//! Video Presets Controller - Entry Point
//!
//! Connects to the endpoint, registers feedback subscriptions, publishes
//! the touch panel, and runs the event loop that applies presets and
//! reconciles drift.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpStream;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use video_presets::{
    panel, Config, JsonRpcTransport, PresetSequencer, Reconciler, XapiClient,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    info!(
        pages = config.pages.len(),
        panel = %config.panel.panel_id,
        "configuration loaded"
    );

    let address = format!("{}:{}", config.endpoint.host, config.endpoint.port);
    let stream = TcpStream::connect(&address)
        .await
        .with_context(|| format!("Failed to connect to endpoint at {address}"))?;
    info!(%address, "connected to endpoint");

    let (transport, mut events) = JsonRpcTransport::start(stream);
    let client = Arc::new(XapiClient::new(Arc::new(transport)));

    client
        .subscribe_feedback()
        .await
        .context("Failed to register feedback subscriptions")?;

    let outputs = client
        .video_outputs()
        .await
        .context("Failed to enumerate video outputs")?;
    info!(outputs = outputs.len(), "video outputs identified");

    let in_call = client
        .call_status()
        .await
        .context("Failed to query call status")?
        .iter()
        .any(|call| call.answered());

    let presentation_mode = client
        .presentation_mode()
        .await
        .context("Failed to query presentation mode")?;

    let config = Arc::new(config);
    panel::sync_panel(&client, &config.panel, &config.pages, in_call)
        .await
        .context("Failed to publish the preset panel")?;
    info!(in_call, "panel published");

    let sequencer = Arc::new(PresetSequencer::new(
        Arc::clone(&client),
        outputs,
        Duration::from_millis(config.sequencer.settle_ms),
    ));
    let mut reconciler = Reconciler::new(
        client,
        sequencer,
        Arc::clone(&config),
        in_call,
        presentation_mode,
    );

    while let Some(event) = events.recv().await {
        reconciler.handle_event(event).await;
    }

    info!("endpoint event stream ended, shutting down");
    Ok(())
}
