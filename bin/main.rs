//! Headless flipdown binary.
#![allow(unreachable_pub, dead_code, clippy::missing_const_for_fn, clippy::option_if_let_else)]
//!
//! Counts down to a target instant, logging the rendered board every tick.
//!
//! ## Usage
//!
//! ```bash
//! # Count down 90 seconds from now and exit at the end
//! flipdown --in-seconds 90 --exit-on-end
//!
//! # Count down to a fixed instant
//! flipdown --target 2030-01-01T00:00:00Z
//!
//! # Start with config file
//! flipdown --config flipdown.toml
//! ```

mod config;

use flipdown::{Clock, ClockOptions, MemorySurface, TimeSource as _, WallTime};
use tokio::{signal, sync::oneshot};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    info!(?config, "loaded configuration");

    let target = config.target(WallTime.now()).ok_or("no target: pass --target or --in-seconds")?;

    // Log the board from the tick callback
    let surface = MemorySurface::new();
    let board = surface.clone();
    let options = config.clock.clone().apply(ClockOptions::default()).on_tick(
        move |remaining, _now| {
            info!(board = %board.snapshot().render_line(), remaining = remaining.floor(), "tick");
        },
    );

    let clock = Clock::new(target, surface, options)?;

    // Register before starting so an already ended countdown is noticed
    let (ended_tx, ended_rx) = oneshot::channel();
    clock
        .if_ended(move || {
            let _ = ended_tx.send(());
        })
        .await
        .start()
        .await;

    tokio::select! {
        _ = ended_rx, if config.exit_on_end => {
            info!("countdown ended, exiting");
        }
        () = shutdown_signal() => {}
    }

    clock.stop().await;
    Ok(())
}

/// Waits for SIGINT or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        () = terminate => {
            info!("received SIGTERM, shutting down");
        }
    }
}
