//! TUI application state.

use flipdown::SurfaceView;

use crate::{
    samples::SharedBoard,
    theme::{StatusReceiver, ThemeStatus},
};

/// A board snapshot ready for rendering.
#[derive(Debug, Clone)]
pub struct BoardView {
    /// Panel title.
    pub title: &'static str,
    /// Surface snapshot.
    pub surface: SurfaceView,
}

/// Application state for the TUI.
#[derive(Debug)]
pub struct App {
    /// All boards.
    boards: Vec<SharedBoard>,
    /// Cached views for rendering.
    views: Vec<BoardView>,
    /// Status receiver for theme updates.
    status_rx: StatusReceiver,
    /// Cached theme status.
    status: ThemeStatus,
    /// Whether the application should quit.
    should_quit: bool,
}

impl App {
    /// Creates a new application.
    pub fn new(boards: Vec<SharedBoard>, status_rx: StatusReceiver) -> Self {
        let views = Vec::with_capacity(boards.len());
        let status = status_rx.borrow().clone();
        Self { boards, views, status_rx, status, should_quit: false }
    }

    /// Updates the cached views from the board surfaces.
    pub fn update_views(&mut self) {
        self.views.clear();
        self.views.extend(
            self.boards.iter().map(|board| BoardView { title: board.title, surface: board.view() }),
        );
        self.status = self.status_rx.borrow().clone();
    }

    /// Returns the cached views.
    pub fn views(&self) -> &[BoardView] {
        &self.views
    }

    /// Returns the current theme status.
    pub fn status(&self) -> &ThemeStatus {
        &self.status
    }

    /// Sets the quit flag.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Returns whether the application should quit.
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }
}
