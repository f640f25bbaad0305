use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::{TestCase, Verdict};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let session = match app.vetting.session() {
        Some(s) => s,
        None => return,
    };

    if session.test_cases.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(format!(
                "No test cases exist for category '{}'.",
                session.tool_config.category
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press s to start over with a different category.",
                Style::default().fg(Color::Yellow),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Tests "));
        f.render_widget(msg, area);
        return;
    }

    let index = app.current_test.min(session.test_cases.len() - 1);
    let test = &session.test_cases[index];
    let verdict = session
        .results
        .iter()
        .find(|r| r.test_id == test.id)
        .map(|r| r.result)
        .unwrap_or(Verdict::Pending);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Scenario header
            Constraint::Min(6),    // Input + expected
            Constraint::Length(4), // Notes
        ])
        .split(area);

    draw_header(f, test, verdict, index, session.test_cases.len(), chunks[0]);
    draw_body(f, test, chunks[1]);
    draw_notes(f, app, test, chunks[2]);
}

fn draw_header(
    f: &mut Frame,
    test: &TestCase,
    verdict: Verdict,
    index: usize,
    total: usize,
    area: Rect,
) {
    let (verdict_text, verdict_color) = verdict_style(verdict);

    let text = vec![
        Line::from(vec![
            Span::styled(
                test.scenario.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  [{}]", verdict_text),
                Style::default().fg(verdict_color),
            ),
        ]),
        Line::from(vec![
            Span::styled(test.category.label(), Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("  weight {}  {}", test.weight, test.difficulty.as_str()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Test {} of {} ", index + 1, total));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_body(f: &mut Frame, test: &TestCase, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let input = Paragraph::new(test.input.clone())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Try this against the tool ")
                .title_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(input, chunks[0]);

    let expected = Paragraph::new(test.expected_behavior.clone())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Expected behavior ")
                .title_style(Style::default().fg(Color::Green)),
        );
    f.render_widget(expected, chunks[1]);
}

fn draw_notes(f: &mut Frame, app: &App, test: &TestCase, area: Rect) {
    // Show pending input if typing, otherwise whatever was recorded
    let notes = if !app.notes_input.is_empty() || app.notes_mode {
        app.notes_input.clone()
    } else {
        app.vetting
            .result_for(&test.id)
            .map(|r| r.notes.clone())
            .unwrap_or_default()
    };

    let text = if notes.is_empty() {
        Line::from(Span::styled(
            "press n to add notes before rating",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::raw(notes))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Notes ")
        .title_style(Style::default().fg(if app.notes_mode {
            Color::Yellow
        } else {
            Color::DarkGray
        }));

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), area);
}

pub fn verdict_style(verdict: Verdict) -> (&'static str, Color) {
    match verdict {
        Verdict::Pass => ("Pass", Color::Green),
        Verdict::Partial => ("Partial", Color::Yellow),
        Verdict::Fail => ("Fail", Color::Red),
        Verdict::Pending => ("Pending", Color::DarkGray),
    }
}
