//! # circadiad — adaptive lighting daemon
//!
//! Composition root that wires the adapters into the controller and runs it.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the tracing subscriber
//! - Construct the event bus, the virtual lights and the sun source
//! - Construct the controller, injecting adapters via port traits
//! - Reload settings on `SIGHUP`
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use circadia_adapter_virtual::{FixedSun, VirtualLights};
use circadia_app::controller::AdaptiveController;
use circadia_app::event_bus::InProcessEventBus;
use circadia_app::system_clock::SystemClock;

use crate::config::Config;

type Lights = VirtualLights<Arc<InProcessEventBus>, SystemClock>;
type Controller =
    AdaptiveController<SystemClock, FixedSun, Arc<Lights>, Arc<Lights>, Arc<InProcessEventBus>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = config.to_settings()?;

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Adapters
    let lights = Arc::new(VirtualLights::new(Arc::clone(&event_bus), SystemClock));
    for light in config.virtual_lights(lights.now())? {
        lights.add(light);
    }
    let sun = FixedSun::new(config.sun.elevation);

    // Controller
    let controller = AdaptiveController::new(
        SystemClock,
        sun,
        Arc::clone(&lights),
        Arc::clone(&lights),
        Arc::clone(&event_bus),
        settings,
    )
    .context("failed to build controller")?;
    controller.set_enabled(config.lighting.enabled);
    controller.start().await;

    tracing::info!(
        controller = %controller.id(),
        lights = lights.entity_ids().len(),
        "circadiad running"
    );

    run_until_shutdown(&controller).await?;

    tracing::info!("shutting down");
    controller.stop().await;
    Ok(())
}

/// Re-read the configuration file and push the new settings.
#[cfg(unix)]
async fn reload(controller: &Controller) {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "configuration reload failed, keeping current settings");
            return;
        }
    };
    let result = match config.to_settings() {
        Ok(settings) => controller.update_settings(settings).await.map_err(Into::into),
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => {
            controller.set_enabled(config.lighting.enabled);
            tracing::info!("configuration reloaded");
        }
        Err(err) => {
            tracing::warn!(%err, "configuration reload failed, keeping current settings");
        }
    }
}

#[cfg(unix)]
async fn run_until_shutdown(controller: &Controller) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).context("failed to install SIGHUP handler")?;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                return result.context("failed to listen for ctrl-c");
            }
            _ = hangup.recv() => reload(controller).await,
        }
    }
}

#[cfg(not(unix))]
async fn run_until_shutdown(_controller: &Controller) -> anyhow::Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")
}
