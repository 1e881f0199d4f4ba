pub mod settings;

use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use unitdrill::{
    celebration::Celebration, drill::Clock, problem::Problem, session::Summary, Outcome,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const DRILL_LEGEND: &str =
    "(enter) check / (tab) new problem / (ctrl+r) restart / (ctrl+f) finish / (ctrl+o) settings / (esc)ape";
const RESULTS_LEGEND: &str = "(r)estart / (s)ettings / (esc)ape";
const INPUT_HINT: &str = "Type only the number. Use a comma or a period as decimal separator.";

/// `mm:ss`, never negative
pub fn format_clock(left: chrono::Duration) -> String {
    let secs = left.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Feedback for the last submission, or nothing when there is none to show.
pub fn feedback_line(outcome: Option<Outcome>, problem: &Problem) -> Option<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let line = match outcome? {
        Outcome::Correct => Line::from(Span::styled("Correct! ✓", bold.fg(Color::Green))),
        Outcome::Wrong => Line::from(vec![
            Span::styled("Wrong. ", bold.fg(Color::Red)),
            Span::styled(
                format!("The correct answer is {}.", problem.expected_answer_text()),
                Style::default().fg(Color::Red),
            ),
        ]),
        Outcome::ParseError => Line::from(Span::styled(
            "Could not read the number. Use a comma or a period.",
            Style::default().fg(Color::Yellow),
        )),
    };
    Some(line)
}

pub fn summary_message(summary: &Summary) -> String {
    if summary.perfect {
        format!(
            "Perfect session! {} of {} (100%).",
            summary.correct, summary.attempted
        )
    } else {
        format!(
            "Session finished. Result: {} correct of {} (≈ {}%).",
            summary.correct, summary.attempted, summary.percentage
        )
    }
}

/// The tail of `input` that fits in `width` columns, leaving room for the cursor.
fn visible_input(input: &str, width: usize) -> &str {
    let room = width.saturating_sub(1);
    let mut start = 0;
    while input[start..].width() > room {
        match input[start..].chars().next() {
            Some(c) => start += c.len_utf8(),
            None => break,
        }
    }
    &input[start..]
}

impl<C: Clock, R: Rng> App<C, R> {
    fn metrics(&self) -> [(&'static str, String); 3] {
        let left = match self.drill.time_remaining(&self.session) {
            Some(left) => ("Time left", format_clock(left)),
            None => ("Left", self.session.remaining().unwrap_or(0).to_string()),
        };
        [
            ("Correct", self.session.correct_count().to_string()),
            ("Attempted", self.session.attempted().to_string()),
            left,
        ]
    }

    fn render_metrics(&self, area: Rect, buf: &mut Buffer) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area);

        for ((label, value), column) in self.metrics().into_iter().zip(columns.iter()) {
            Paragraph::new(vec![
                Line::from(Span::styled(
                    label,
                    Style::default().add_modifier(Modifier::DIM),
                )),
                Line::from(Span::styled(
                    value,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ])
            .alignment(Alignment::Center)
            .render(*column, buf);
        }
    }

    fn render_drilling(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // metrics
                Constraint::Length(1),
                Constraint::Length(2), // feedback
                Constraint::Length(2), // prompt
                Constraint::Length(3), // input
                Constraint::Length(1), // hint
                Constraint::Min(0),
                Constraint::Length(2), // legend
            ])
            .split(area);

        self.render_metrics(chunks[0], buf);

        let problem = self.session.current_problem();
        if let Some(line) = feedback_line(self.session.last_feedback(), problem) {
            Paragraph::new(line)
                .wrap(Wrap { trim: true })
                .render(chunks[2], buf);
        }

        Paragraph::new(Span::styled(
            problem.prompt(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

        let block = Block::default().borders(Borders::ALL).title(" Answer ");
        let inner = block.inner(chunks[4]);
        block.render(chunks[4], buf);
        Paragraph::new(Line::from(vec![
            Span::raw(visible_input(&self.input, inner.width as usize).to_string()),
            Span::styled("█", Style::default().add_modifier(Modifier::DIM)),
        ]))
        .render(inner, buf);

        Paragraph::new(Span::styled(
            INPUT_HINT,
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .render(chunks[5], buf);

        Paragraph::new(Span::styled(
            DRILL_LEGEND,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .wrap(Wrap { trim: true })
        .render(chunks[7], buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // metrics
                Constraint::Min(1),
                Constraint::Length(2), // summary
                Constraint::Min(1),
                Constraint::Length(1), // legend
            ])
            .split(area);

        self.render_metrics(chunks[0], buf);

        let summary = self.session.summary();
        let style = if summary.perfect {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Paragraph::new(Span::styled(summary_message(&summary), style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            RESULTS_LEGEND,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[4], buf);

        if self.celebration.is_active() {
            render_balloons(&self.celebration, area, buf);
        }
    }
}

impl<C: Clock, R: Rng> Widget for &App<C, R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Drilling => self.render_drilling(area, buf),
            AppState::Results => self.render_results(area, buf),
            AppState::Settings => settings::render_settings(self, area, buf),
        }
    }
}

fn render_balloons(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Red,
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Blue,
        Color::LightRed,
    ];

    for balloon in &celebration.balloons {
        if balloon.x < 0.0 {
            continue;
        }
        let x = balloon.x as u16;
        let color = colors[balloon.color_index % colors.len()];
        let parts = [
            (balloon.y, balloon.symbol, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            (balloon.string_y(), '|', Style::default().add_modifier(Modifier::DIM)),
        ];
        for (y, symbol, style) in parts {
            if y < 0.0 {
                continue;
            }
            let y = y as u16;
            if x < area.width && y < area.height {
                if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                    cell.set_symbol(&symbol.to_string());
                    cell.set_style(style);
                }
            }
        }
    }
}
