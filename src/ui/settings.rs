use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unitdrill::{config::Config, drill::Clock};

use crate::App;

const SETTINGS_LEGEND: &str = "(enter) save and start / (esc) back / (q)uit";

fn setting_line(label: &str, key: &str, value: Vec<Span<'static>>) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{label:<10}"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{key:<8}"),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ];
    spans.extend(value);
    Line::from(spans)
}

/// One `[x] 1 mm` entry per unit of the selected category.
pub fn unit_spans(settings: &Config, units: &[&str]) -> Vec<Span<'static>> {
    units
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            let enabled = settings.unit_enabled(unit);
            let style = if enabled {
                Style::default().fg(Color::Green)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            Span::styled(
                format!("[{}] {} {}  ", if enabled { "x" } else { " " }, i + 1, unit),
                style,
            )
        })
        .collect()
}

pub fn length_text(settings: &Config) -> String {
    if settings.timed {
        format!("{} min", settings.minutes)
    } else {
        format!("{} correct answers", settings.question_count)
    }
}

pub fn render_settings<C: Clock, R: Rng>(app: &App<C, R>, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Settings ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(2), // notice
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let settings = &app.settings;
    let catalog = app.drill.catalog();
    let title = catalog
        .category(&settings.category)
        .map(|c| c.title.clone())
        .unwrap_or_else(|_| settings.category.clone());
    let units = catalog.units_of(&settings.category).unwrap_or_default();
    let unit_keys = format!("(1-{})", units.len().max(1));

    let lines = vec![
        setting_line("Category", "(c)", vec![Span::raw(title)]),
        setting_line("Units", &unit_keys, unit_spans(settings, &units)),
        setting_line(
            "Numbers",
            "(d)",
            vec![Span::raw(settings.difficulty.to_string())],
        ),
        setting_line(
            "Mode",
            "(m)",
            vec![Span::raw(if settings.timed {
                "Time limit"
            } else {
                "Number of questions"
            })],
        ),
        setting_line("Length", "(+/-)", vec![Span::raw(length_text(settings))]),
    ];
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(chunks[0], buf);

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        ))
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
    }

    Paragraph::new(Span::styled(
        SETTINGS_LEGEND,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}
