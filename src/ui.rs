pub mod charting;
pub mod leaderboard;

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, View};
use crate::session::{Mode, TestResult, TimeLimit};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Lines of the word stream visible while typing
pub const WINDOW_LINES: usize = 3;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.view {
            View::Login => render_login(self, area, buf),
            View::Leaderboard => leaderboard::render_leaderboard(self, area, buf),
            View::Test => match self.controller.result() {
                Some(result) => render_results(self, result, area, buf),
                None => render_typing(self, area, buf),
            },
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn render_login(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let width = 30.min(area.width);
    let input_area = Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..chunks[1]
    };

    let input = Paragraph::new(Line::from(vec![
        Span::styled(app.username_draft.clone(), bold()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("choose a username"),
    );
    input.render(input_area, buf);

    Paragraph::new(Span::styled(
        "(enter) start / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let controller = &app.controller;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(2),
            Constraint::Length(WINDOW_LINES as u16),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let header = if controller.is_running() {
        Line::from(Span::styled(
            controller.time_remaining().to_string(),
            bold().fg(Color::Yellow),
        ))
    } else {
        config_bar(controller.config().mode, controller.config().time_limit)
    };
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let lines = word_window(app, chunks[2].width as usize);
    Paragraph::new(lines).render(chunks[2], buf);

    let footer = if controller.is_running() {
        let live = controller.live_score();
        Span::styled(
            format!("{} wpm   {}% acc", live.wpm, live.accuracy),
            dim_bold(),
        )
    } else {
        Span::styled(
            "(↑↓) mode / (←→) time / (tab) restart / (ctrl+l) leaderboard / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        )
    };
    let footer_area = Rect {
        y: chunks[3].y + 1,
        height: 1,
        ..chunks[3]
    };
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .render(footer_area, buf);
}

fn config_bar(mode: Mode, time_limit: TimeLimit) -> Line<'static> {
    let active = bold().fg(Color::Yellow);
    let inactive = dim_bold();

    let mut spans = Vec::new();
    for m in [Mode::Casual, Mode::Competition] {
        let style = if m == mode { active } else { inactive };
        spans.push(Span::styled(m.to_string(), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("|", inactive));
    for limit in TimeLimit::OPTIONS {
        let style = if limit == time_limit { active } else { inactive };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(limit.to_string(), style));
    }
    Line::from(spans)
}

/// Split `words` into lines no wider than `width`, as word index ranges.
/// A word wider than the line gets a line of its own.
pub fn wrap_words(words: &[String], width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut line_width = 0;

    for (idx, word) in words.iter().enumerate() {
        let w = word.width();
        if idx > start && line_width + 1 + w > width {
            lines.push(start..idx);
            start = idx;
            line_width = w;
        } else if idx == start {
            line_width = w;
        } else {
            line_width += 1 + w;
        }
    }
    if start < words.len() {
        lines.push(start..words.len());
    }
    lines
}

/// The three lines around the cursor, coloured by what has been typed
fn word_window(app: &App, width: usize) -> Vec<Line<'static>> {
    let controller = &app.controller;
    let buffer = controller.buffer();
    let typed = controller.typed();
    let words = buffer.words();

    let green_bold = bold().fg(Color::Green);
    let red_bold = bold().fg(Color::Red);
    let cursor_style = dim_bold().add_modifier(Modifier::UNDERLINED);

    let ranges = wrap_words(words, width.max(1));
    let (cursor_word, _) = buffer.locate(typed.len());
    let cursor_line = ranges
        .iter()
        .position(|r| r.contains(&cursor_word))
        .unwrap_or(0);
    // keep the finished line above the cursor in view
    let first = cursor_line.saturating_sub(1);

    let word_starts: Vec<usize> = words
        .iter()
        .scan(0, |offset, w| {
            let start = *offset;
            *offset += w.chars().count();
            Some(start)
        })
        .collect();

    ranges
        .iter()
        .skip(first)
        .take(WINDOW_LINES)
        .map(|range| {
            let mut spans = Vec::new();
            for word_idx in range.clone() {
                if word_idx > range.start {
                    spans.push(Span::raw(" "));
                }
                let start = word_starts[word_idx];
                for (offset, expected) in words[word_idx].chars().enumerate() {
                    let idx = start + offset;
                    let span = match typed.get(idx) {
                        Some(&c) if c == expected => Span::styled(c.to_string(), green_bold),
                        Some(&c) => Span::styled(c.to_string(), red_bold),
                        None if idx == typed.len() => {
                            Span::styled(expected.to_string(), cursor_style)
                        }
                        None => Span::styled(expected.to_string(), dim_bold()),
                    };
                    spans.push(span);
                }
            }
            Line::from(spans)
        })
        .collect()
}

fn render_results(app: &App, result: &TestResult, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // headline
            Constraint::Min(1),    // chart
            Constraint::Length(1), // details
            Constraint::Length(1), // rank
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let bold_style = bold();

    Paragraph::new(Line::from(vec![
        Span::styled(format!("{} wpm", result.wpm), bold_style.fg(Color::Yellow)),
        Span::raw("   "),
        Span::styled(format!("{}% acc", result.accuracy), bold_style.fg(Color::Yellow)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let (duration, highest_wpm) =
        charting::compute_chart_params(&result.history, result.time_limit.secs());
    let wpm_points = charting::wpm_points(&result.history);
    let raw_points = charting::raw_points(&result.history);
    let datasets = vec![
        Dataset::default()
            .name("raw")
            .marker(Marker::Braille)
            .style(Style::default().fg(Color::DarkGray))
            .graph_type(GraphType::Line)
            .data(&raw_points),
        Dataset::default()
            .name("wpm")
            .marker(Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&wpm_points),
    ];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        )
        .render(chunks[1], buf);

    let counts = &result.character_counts;
    Paragraph::new(Span::styled(
        format!(
            "{} {}s   raw {}   characters {}/{}/{}/{}   consistency {}%   time {}s",
            result.mode,
            result.time_limit,
            result.raw_wpm,
            counts.correct,
            counts.incorrect,
            counts.extra,
            counts.missed,
            result.consistency,
            result.time()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let board = app.controller.leaderboard();
    let rank = app
        .controller
        .entry_id()
        .and_then(|id| board.borrow().rank_of(id));
    if let Some(rank) = rank {
        Paragraph::new(Span::styled(
            format!("#{rank} on the leaderboard"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled(
        "(n)ext test / (l)eaderboard / (tab) restart / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[5], buf);
}
