use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::runner::verdict_style;
use crate::models::{Impact, Verdict};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Score row
            Constraint::Min(0),    // Patterns + test summary
        ])
        .split(area);

    draw_score(f, app, chunks[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    draw_patterns(f, app, bottom[0]);
    draw_test_summary(f, app, bottom[1]);
}

fn draw_score(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.vetting.score_breakdown() {
        Some(breakdown) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Overall readiness: ", Style::default().fg(Color::Gray)),
                    Span::styled(
                        format!("{}/100", breakdown.overall),
                        Style::default()
                            .fg(score_color(breakdown.overall))
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(""),
            ];
            for (category, cs) in &breakdown.categories {
                let score_text = if cs.possible > 0.0 {
                    format!("{:>3}", cs.score)
                } else {
                    "  -".to_string()
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{:<16}", category.label()),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(score_text, Style::default().fg(score_color(cs.score))),
                    Span::styled(
                        format!("   {}/{} passed   weight {}", cs.passed, cs.total, cs.weight),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
            lines
        }
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "No score: no test cases are active.",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Readiness Score ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_patterns(f: &mut Frame, app: &App, area: Rect) {
    let detected = app.vetting.detected_patterns();

    let items: Vec<ListItem> = if detected.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No failure patterns detected.",
            Style::default().fg(Color::Green),
        )))]
    } else {
        detected
            .iter()
            .flat_map(|p| {
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        format!("[{}] ", p.impact.label()),
                        Style::default().fg(impact_color(p.impact)),
                    ),
                    Span::styled(
                        p.name.clone(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])];
                for step in &p.remediation {
                    lines.push(Line::from(Span::styled(
                        format!("  - {}", step),
                        Style::default().fg(Color::Gray),
                    )));
                }
                lines.push(Line::from(""));
                vec![ListItem::new(lines)]
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Detected Failure Patterns ")
        .title_style(Style::default().fg(Color::Red));
    f.render_widget(List::new(items).block(block), area);
}

fn draw_test_summary(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .vetting
        .session()
        .map(|s| {
            s.test_cases
                .iter()
                .map(|test| {
                    let verdict = s
                        .results
                        .iter()
                        .find(|r| r.test_id == test.id)
                        .map(|r| r.result)
                        .unwrap_or(Verdict::Pending);
                    let (text, color) = verdict_style(verdict);
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("{:<8}", text),
                            Style::default().fg(color),
                        ),
                        Span::styled(
                            format!("{:<8} ", test.id),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled(
                            truncate(&test.scenario, 30),
                            Style::default().fg(Color::White),
                        ),
                    ]))
                })
                .collect()
        })
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tests ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(List::new(items).block(block), area);
}

fn score_color(score: u32) -> Color {
    if score >= 80 {
        Color::Green
    } else if score >= 60 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn impact_color(impact: Impact) -> Color {
    match impact {
        Impact::Critical => Color::Red,
        Impact::High => Color::LightRed,
        Impact::Medium => Color::Yellow,
        Impact::Low => Color::DarkGray,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
