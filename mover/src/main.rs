mod check;
mod cli;
mod config;
mod error;
mod event;
mod mover;
mod obs;
mod paths;
mod sanitize;
mod translate;
mod window;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::config::Config;
use crate::event::MoverEvent;
use crate::mover::{MoveSettings, Mover};
use crate::obs::{ListenerConfig, SessionListener};
use crate::window::{tracker, WindowCell};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recording_mover=info")),
        )
        .init();

    let args = Args::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => paths::config_file_path()?,
    };
    let mut config = Config::load_or_default(&config_path)?;
    config.apply_args(&args)?;
    config
        .save(&config_path)
        .with_context(|| format!("saving merged settings to {}", config_path.display()))?;
    info!(
        path = %config_path.display(),
        translations = config.translate.len(),
        shorthands = config.shorthand.len(),
        "Configuration loaded"
    );
    if config.translate.is_empty() {
        debug!("No path translation configured");
    }
    for entry in config.translate.entries() {
        debug!(from = %entry.from, to = %entry.to, "Path translation");
    }

    if config.check_only {
        return check::run(&config).await;
    }

    // ── OBS connection ────────────────────────────────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<MoverEvent>(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Ctrl+C queues a shutdown behind any pending events, so an in-flight move
    // completes, then stops the background tasks.
    {
        let tx = event_tx.clone();
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(MoverEvent::Shutdown).await;
                let _ = shutdown_tx.send(true);
            }
        });
    }

    let mut listener = SessionListener::new(
        ListenerConfig::from_config(&config),
        event_tx,
        shutdown_rx.clone(),
    );
    let session = match listener.connect_at_startup(config.is_known_endpoint()).await {
        Ok(session) => session,
        Err(error::ConnectionError::Cancelled) => return Ok(()),
        Err(e) => {
            return Err(e).with_context(|| format!("connecting to OBS at {}", config.endpoint()));
        }
    };
    info!(endpoint = %config.endpoint(), "Connected to OBS");

    config.remember_endpoint(chrono::Utc::now().timestamp());
    if let Err(e) = config.save(&config_path) {
        warn!(error = %e, "Could not record OBS endpoint");
    }

    // ── Background tasks ──────────────────────────────────────────────────────
    let cell = WindowCell::new();
    let tracker_handle = tokio::spawn(tracker::run(
        window::source_for(config.track_command.as_deref()),
        cell.clone(),
        config.track_interval(),
        shutdown_rx,
    ));
    let listener_handle = tokio::spawn(listener.run(session));

    println!(
        "recording-mover v{} watching {}",
        env!("CARGO_PKG_VERSION"),
        config.endpoint()
    );

    // ── Event loop ────────────────────────────────────────────────────────────
    Mover::new(cell, MoveSettings::from_config(&config))
        .run(event_rx)
        .await;

    let _ = shutdown_tx.send(true);
    let (tracker_result, listener_result) = tokio::join!(tracker_handle, listener_handle);
    tracker_result.context("window tracker task panicked")?;
    listener_result.context("OBS listener task panicked")?;
    Ok(())
}
