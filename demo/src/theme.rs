//! Periodic theme toggling across every board.

use std::time::Duration;

use flipdown::DEFAULT_THEME;
use tokio::{sync::watch, task::JoinHandle, time::interval};
use tracing::debug;

use crate::samples::SharedBoard;

/// Theme status shown in the header.
#[derive(Debug, Clone, Default)]
pub struct ThemeStatus {
    /// Number of toggles so far.
    pub toggles: u64,
    /// Theme of the page, as opposed to the per-clock themes.
    pub page: String,
}

/// Sender for theme status updates.
pub type StatusSender = watch::Sender<ThemeStatus>;

/// Receiver for theme status updates.
pub type StatusReceiver = watch::Receiver<ThemeStatus>;

/// Creates a new status channel.
pub fn channel() -> (StatusSender, StatusReceiver) {
    watch::channel(ThemeStatus { toggles: 0, page: DEFAULT_THEME.to_string() })
}

/// Returns the other theme.
pub fn toggled(theme: &str) -> &'static str {
    if theme == "light" { "dark" } else { "light" }
}

/// Toggles the theme of every board on a fixed interval.
#[derive(Debug)]
pub struct ThemeToggler {
    boards: Vec<SharedBoard>,
    interval: Duration,
    status_tx: StatusSender,
}

impl ThemeToggler {
    /// Creates a new toggler.
    pub const fn new(boards: Vec<SharedBoard>, interval: Duration, status_tx: StatusSender) -> Self {
        Self { boards, interval, status_tx }
    }

    /// Spawns the toggle loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = interval(self.interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.toggle_all().await;
        }
    }

    async fn toggle_all(&self) {
        for board in &self.boards {
            let next = toggled(&board.clock.theme().await);
            board.clock.set_theme(next).await;
        }
        self.status_tx.send_modify(|status| {
            status.toggles += 1;
            status.page = toggled(&status.page).to_string();
        });
        debug!(toggles = self.status_tx.borrow().toggles, "themes toggled");
    }
}
