//! TUI rendering with ratatui.

use flipdown::{
    Clock, Face, GroupView, HeadingPosition, MemorySurface, RotorView, SurfaceView, WallTime,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::app::BoardView;
use crate::theme::ThemeStatus;

/// Minimum width for each board panel.
/// Wide enough for a 4 digit day group with headings.
const MIN_PANEL_WIDTH: u16 = 40;

/// Width of one rotor cell, e.g. `[7]`.
const ROTOR_WIDTH: usize = 3;

/// Renders the application state to the terminal.
pub fn render(frame: &mut Frame<'_>, views: &[BoardView], status: &ThemeStatus) {
    let area = frame.area();

    // Split into header and main content
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(frame, main_chunks[0], status);
    render_boards_grid(frame, main_chunks[1], views);
}

/// Renders boards in a grid layout based on available width.
fn render_boards_grid(frame: &mut Frame<'_>, area: Rect, views: &[BoardView]) {
    if views.is_empty() {
        return;
    }

    let cols_per_row = (area.width / MIN_PANEL_WIDTH).max(1) as usize;
    let cols_per_row = cols_per_row.min(views.len());
    let num_rows = views.len().div_ceil(cols_per_row);

    let row_constraints: Vec<Constraint> =
        (0..num_rows).map(|_| Constraint::Ratio(1, num_rows as u32)).collect();
    let row_chunks =
        Layout::default().direction(Direction::Vertical).constraints(row_constraints).split(area);

    for (row_idx, row_area) in row_chunks.iter().enumerate() {
        let start_idx = row_idx * cols_per_row;
        let end_idx = (start_idx + cols_per_row).min(views.len());
        let row_views = &views[start_idx..end_idx];

        let col_constraints: Vec<Constraint> =
            row_views.iter().map(|_| Constraint::Ratio(1, row_views.len() as u32)).collect();
        let col_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(*row_area);

        for (col_idx, view) in row_views.iter().enumerate() {
            render_board(frame, col_chunks[col_idx], view);
        }
    }
}

/// Renders the header showing the page theme.
fn render_header(frame: &mut Frame<'_>, area: Rect, status: &ThemeStatus) {
    let title = format!(" Flipdown Demo - v{} ", Clock::<WallTime, MemorySurface>::version());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let status_line = Line::from(vec![
        Span::styled("Theme: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            status.page.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Toggles: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            status.toggles.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[q] quit", Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(status_line), inner_area);
}

/// Colors for a clock theme: (border, digit).
fn theme_colors(theme: &str) -> (Color, Style) {
    if theme == "light" {
        (Color::White, Style::default().fg(Color::Black).bg(Color::White))
    } else {
        (Color::DarkGray, Style::default().fg(Color::White).bg(Color::Black))
    }
}

/// Renders a single board panel.
fn render_board(frame: &mut Frame<'_>, area: Rect, view: &BoardView) {
    let surface = &view.surface;
    let (border_color, digit_style) = theme_colors(&surface.theme);
    let border_color = if surface.ended { Color::Red } else { border_color };

    let mut title = format!(" {} [{}] ", view.title, surface.theme);
    if surface.ended {
        title.push_str("ENDED ");
    } else if surface.stopped {
        title.push_str("STOPPED ");
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let labels = Line::from(heading_cells(surface));
    let digits = Line::from(digit_spans(surface, digit_style));
    let lines = match heading_position(surface) {
        HeadingPosition::Top => vec![labels, digits],
        HeadingPosition::Bottom => vec![digits, labels],
    };

    frame.render_widget(Paragraph::new(lines), inner_area);
}

/// Visible groups paired with the delimiter drawn before each.
fn visible_groups(surface: &SurfaceView) -> impl Iterator<Item = (Option<&str>, &GroupView)> {
    let mut first = true;
    surface.groups.iter().filter(|group| group.visible).map(move |group| {
        let delimiter = if first {
            None
        } else {
            group.delimiter.as_deref().filter(|glyph| !glyph.is_empty())
        };
        first = false;
        (delimiter, group)
    })
}

fn heading_position(surface: &SurfaceView) -> HeadingPosition {
    surface.groups.iter().find(|group| group.visible).map(|group| group.position).unwrap_or_default()
}

/// Width of a delimiter cell.
fn delimiter_width(glyph: &str) -> usize {
    glyph.chars().count() + 2
}

/// Heading line, each label centered over its group.
fn heading_cells(surface: &SurfaceView) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (delimiter, group) in visible_groups(surface) {
        if let Some(glyph) = delimiter {
            spans.push(Span::raw(" ".repeat(delimiter_width(glyph))));
        }
        let width = group.rotors.len() * ROTOR_WIDTH;
        let label = group.label.as_deref().unwrap_or_default();
        spans.push(Span::styled(
            format!("{label:^width$}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans
}

/// Digit line; a rotor mid-flip shows its incoming glyph highlighted.
fn digit_spans(surface: &SurfaceView, digit_style: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (delimiter, group) in visible_groups(surface) {
        if let Some(glyph) = delimiter {
            spans.push(Span::styled(format!(" {glyph} "), Style::default().fg(Color::DarkGray)));
        }
        for rotor in group.rotors.iter().rev() {
            spans.push(rotor_span(rotor, digit_style));
        }
    }
    spans
}

fn rotor_span(rotor: &RotorView, digit_style: Style) -> Span<'static> {
    if rotor.flipping {
        Span::styled(
            format!("[{}]", rotor.face(Face::BottomLeaf)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!("[{}]", rotor.face(Face::FrontStatic)), digit_style)
    }
}

#[cfg(test)]
mod tests {
    use flipdown::{DigitAddr, RenderSurface, Slot, Unit};

    use super::*;

    fn text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn board() -> MemorySurface {
        let mut surface = MemorySurface::new();
        for unit in Unit::ALL {
            surface.set_rotor_count(unit, 2);
            for place in 0..2 {
                surface.set_face(DigitAddr::new(unit, place), Face::FrontStatic, "1");
                surface.set_face(DigitAddr::new(unit, place), Face::BottomLeaf, "1");
            }
            surface.set_label(Slot::Group(unit), Some("Min"), HeadingPosition::Bottom);
            surface.set_label(Slot::Delimiter(unit), Some(":"), HeadingPosition::Bottom);
        }
        surface.set_visible(Unit::Days, false);
        surface
    }

    #[test]
    fn test_digit_line_skips_hidden_groups() {
        let view = board().snapshot();
        assert_eq!(text(&digit_spans(&view, Style::default())), "[1][1] : [1][1] : [1][1]");
        assert_eq!(heading_position(&view), HeadingPosition::Bottom);
    }

    #[test]
    fn test_headings_align_with_groups() {
        let view = board().snapshot();
        let digits = text(&digit_spans(&view, Style::default()));
        let labels = text(&heading_cells(&view));
        assert_eq!(labels.len(), digits.len());
        assert!(labels.starts_with(" Min  "));
    }

    #[test]
    fn test_flipping_rotor_shows_incoming_glyph() {
        let mut surface = board();
        let ones = DigitAddr::new(Unit::Seconds, 0);
        surface.set_face(ones, Face::BottomLeaf, "9");
        surface.set_flipping(ones, true);

        let view = surface.snapshot();
        assert!(text(&digit_spans(&view, Style::default())).ends_with("[1][9]"));
    }
}
