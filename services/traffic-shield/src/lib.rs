//! TrafficShield - simulated smart-traffic monitoring service
//!
//! Fabricates traffic readings for the selected traffic-light device on a
//! fixed cadence, occasionally records ledger confirmations, derives anomaly
//! alerts, and serves the rolling windows as JSON.

pub mod config;
pub mod dashboard;
pub mod devices;
pub mod engine;
pub mod error;
pub mod model;
pub mod simulator;
pub mod source;
pub mod state;
pub mod window;

pub use config::{load_config, Config};
pub use error::{Result, TrafficShieldError};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::devices::DeviceRegistry;
use crate::engine::Engine;

/// Run the traffic-shield service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let cancel = CancellationToken::new();

    let registry = DeviceRegistry::new(config.devices.clone());
    let state = state::new_state_handle(
        &config.simulator,
        registry,
        config.dashboard.privacy_mode,
    );
    let engine = Arc::new(Engine::new(
        &config.simulator,
        Arc::clone(&state),
        cancel.clone(),
    ));

    engine
        .select_device(&config.simulator.initial_device)
        .await?;

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let dashboard_engine = Arc::clone(&engine);
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let router = dashboard::build_router(dashboard_engine);
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            tracing::info!("Dashboard API listening on http://{}", addr);

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Dashboard stopped");
        });
    }

    tracing::info!("TrafficShield simulator started");

    // Blocks until cancelled, then stops the ticker
    engine.run().await;

    tracing::info!("TrafficShield simulator stopped");

    Ok(())
}
