//! Key bindings for the board.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

/// Applies a terminal event to the board, returning whether it was a binding.
pub fn handle_event(app: &mut App, event: Event) -> bool {
    let Event::Key(key) = event else { return false };
    let bound = is_quit(key);
    if bound {
        app.quit();
    }
    bound
}

/// `q`, `Esc` and `Ctrl+C` leave the board.
fn is_quit(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
