//! Flipdown demo binary with TUI visualization.
#![allow(unreachable_pub, dead_code, clippy::missing_const_for_fn)]
//!
//! This demo runs several sample countdowns side by side, toggles their
//! themes on an interval and renders every rotor in a terminal UI.

mod config;
mod samples;
mod theme;
mod tui;

use clap::Parser;

use crate::{config::DemoConfig, samples::Board, theme::ThemeToggler, tui::App};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration
    let config = DemoConfig::parse();

    // Mount and start every sample clock
    let boards = Board::mount_all(samples::samples(), config.base_offset)?;
    for board in &boards {
        board.start().await;
    }

    // Create status channel for toggler -> TUI communication
    let (status_tx, status_rx) = theme::channel();

    // Spawn theme toggler
    let toggler = ThemeToggler::new(boards.clone(), config.theme_interval(), status_tx);
    let toggler_handle = toggler.spawn();

    // Run TUI
    let app = App::new(boards.clone(), status_rx);
    tui::run(app).await?;

    // Stop everything
    toggler_handle.abort();
    for board in &boards {
        board.stop().await;
    }

    Ok(())
}
