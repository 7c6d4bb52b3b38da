//! Rust+ MQTT Bridge
//!
//! Main entry point for the Home Assistant add-on.

use anyhow::{Context, Result};
use rp_api::AppState;
use rp_config::{load_or_default, DEFAULT_OPTIONS_PATH};
use rp_mqtt::{DiscoveryPublisher, MqttBus};
use rp_probe::{Prober, WebSocketConnector};
use rp_storage::{StateStore, DEFAULT_STATE_PATH};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ingress port declared in the add-on's config.yaml
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8099";

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!(
        "Rust+ MQTT Bridge starting (v{})...",
        env!("CARGO_PKG_VERSION")
    );

    let options_path = env_or("RUSTPLUS_OPTIONS_PATH", DEFAULT_OPTIONS_PATH);
    let state_path = env_or("RUSTPLUS_STATE_PATH", DEFAULT_STATE_PATH);
    let listen_addr = env_or("RUSTPLUS_LISTEN_ADDR", DEFAULT_LISTEN_ADDR);

    let listen_addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", listen_addr))?;

    let options = load_or_default(&options_path);
    info!("MQTT broker: {}", options.mqtt.broker_url());

    let store = StateStore::new(&state_path);
    let state = store.load().await;
    info!("State file: {}", state_path);
    info!(
        "Credentials {}, {} device(s) configured",
        if state.credentials.is_paired() {
            "saved"
        } else {
            "not paired"
        },
        state.devices.len()
    );

    let bus = Arc::new(MqttBus::connect(&options.mqtt));
    let publisher = DiscoveryPublisher::from_options(bus, &options.mqtt);
    let prober = Prober::new(Arc::new(WebSocketConnector));

    let app_state = AppState::new(store, prober, publisher);

    let listen_addr_str = listen_addr.to_string();
    tokio::select! {
        result = rp_api::start_server(app_state, &listen_addr_str) => {
            result.with_context(|| format!("web UI on {} stopped", listen_addr))?;
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down...");
        }
    }

    Ok(())
}
