//! Terminal board for the demo clocks.

mod app;
mod input;
mod view;

use std::{io, time::Duration};

pub use app::App;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

/// Redraw period, a fifth of a flip.
const FRAME_RATE: Duration = Duration::from_millis(100);

type BoardTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Draws the board until a quit key is pressed.
pub async fn run(mut app: App) -> io::Result<()> {
    let mut terminal = enter()?;
    let result = draw_loop(&mut terminal, &mut app);
    leave(&mut terminal)?;
    result
}

fn enter() -> io::Result<BoardTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn leave(terminal: &mut BoardTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn draw_loop(terminal: &mut BoardTerminal, app: &mut App) -> io::Result<()> {
    while !app.should_quit() {
        app.update_views();
        terminal.draw(|frame| view::render(frame, app.views(), app.status()))?;

        // Clocks tick on other workers while this one waits for keys.
        if tokio::task::block_in_place(|| event::poll(FRAME_RATE))? {
            if let Ok(evt @ Event::Key(_)) = event::read() {
                input::handle_event(app, evt);
            }
        }
    }
    Ok(())
}
