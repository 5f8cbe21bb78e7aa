//! Antarctic Explorer - live temperature dashboard
//!
//! Generates a synthetic temperature reading on a fixed interval, keeps the
//! most recent readings in a bounded history, and serves derived views
//! (latest value, windowed average, trend line) over HTTP.

pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod generator;
pub mod history;
pub mod reading;
pub mod state;
pub mod stats;
pub mod view;

pub use config::{load_config, Config, ConfigOverrides};
pub use error::{ExplorerError, Result};
pub use reading::Reading;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::generator::{Clock, ReadingGenerator, SystemClock};
use crate::view::ViewCache;

/// Run the antarctic explorer service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    run_until_cancelled(config, cancel).await
}

/// Run the service until `cancel` is triggered
pub async fn run_until_cancelled(config: Config, cancel: CancellationToken) -> Result<()> {
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = state::new_state_handle(config.history.capacity)?;
    let generator = ReadingGenerator::from_config(&config.generator, Arc::clone(&clock));
    let engine = Engine::new(
        generator,
        Arc::clone(&state),
        config.generator.refresh_interval(),
        cancel.clone(),
    );

    // Start dashboard if enabled
    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let views = Arc::new(ViewCache::new(
            Arc::clone(&state),
            Arc::clone(&clock),
            config.history.average_window(),
        ));
        let refresh_interval_ms = config.generator.refresh_interval().as_millis() as u64;
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let router = dashboard::build_router(views, refresh_interval_ms);
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));

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
            tracing::info!("Dashboard listening on http://{}", addr);

            if let Err(e) = dashboard::serve(listener, router, cancel_for_dashboard).await {
                tracing::error!("{}", e);
            }

            tracing::debug!("Dashboard stopped");
        });
    }

    tracing::info!(
        "Antarctic explorer started: one reading every {}s, keeping the last {}",
        config.generator.refresh_interval_seconds,
        config.history.capacity
    );

    // Run the engine (blocks until cancelled)
    engine.run().await;

    tracing::info!("Antarctic explorer stopped");

    Ok(())
}
