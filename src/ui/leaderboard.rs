use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::app::App;
use crate::leaderboard::LeaderboardEntry;

/// Pure presenter for a single leaderboard row
pub fn present_row(rank: usize, entry: &LeaderboardEntry, is_current_user: bool) -> Row<'static> {
    let row = Row::new(vec![
        Cell::from(format!("#{rank}")),
        Cell::from(entry.username.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(entry.wpm.to_string()),
        Cell::from(format!("{:.1}%", entry.accuracy)),
        Cell::from(entry.date.clone()),
    ]);

    if is_current_user {
        row.style(Style::default().fg(Color::Yellow))
    } else {
        row
    }
}

pub fn render_leaderboard(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Min(0),    // table
            Constraint::Length(2), // instructions
        ])
        .split(area);

    let board = app.controller.leaderboard();
    let board = board.borrow();
    let username = app.controller.username();

    if board.is_empty() {
        Paragraph::new("No results yet. Finish a test to get on the board.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .render(chunks[0], buf);
    } else {
        let header = Row::new(vec!["rank", "user", "wpm", "accuracy", "date"])
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .bottom_margin(1);

        let rows: Vec<Row> = board
            .entries()
            .iter()
            .enumerate()
            .map(|(idx, entry)| present_row(idx + 1, entry, entry.username == username))
            .collect();

        let widths = [
            Constraint::Length(6),  // rank
            Constraint::Length(16), // user
            Constraint::Length(6),  // wpm
            Constraint::Length(10), // accuracy
            Constraint::Min(12),    // date
        ];

        Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
            .column_spacing(2)
            .render(chunks[0], buf);
    }

    Paragraph::new("(b/esc) back  (tab) restart")
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}
