use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets::{results, runner, selector};
use super::{App, SelectorStep, View};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_title(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

fn draw_title(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "VetBot",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(session) = app.vetting.session() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            session.tool_config.name.clone(),
            Style::default().fg(Color::White),
        ));
        spans.push(Span::styled(
            format!("  ({:.0}% rated)", app.vetting.progress()),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(
            "  New assessment",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let title = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Selector => selector::draw(f, app, area),
        View::Runner => runner::draw(f, app, area),
        View::Results => results::draw(f, app, area),
    }
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.notes_mode {
        vec![
            Span::styled("notes> ", Style::default().fg(Color::Yellow)),
            Span::raw(app.notes_input.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            Span::styled("<CR>", Style::default().fg(Color::Cyan)),
            Span::raw(" Keep  "),
            Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
            Span::raw(" Discard"),
        ]
    } else if app.view == View::Selector && app.selector_step == SelectorStep::Name {
        vec![
            Span::styled("name> ", Style::default().fg(Color::Yellow)),
            Span::raw(app.name_input.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            Span::styled("<CR>", Style::default().fg(Color::Cyan)),
            Span::raw(" Start  "),
            Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
            Span::raw(" Back"),
        ]
    } else {
        let mut spans = Vec::new();
        match app.view {
            View::Selector => {
                spans.extend(vec![
                    Span::styled("j/k", Style::default().fg(Color::Cyan)),
                    Span::raw(" Nav  "),
                    Span::styled("<CR>", Style::default().fg(Color::Cyan)),
                    Span::raw(" Select  "),
                ]);
                if app.selector_step == SelectorStep::UseCase {
                    spans.extend(vec![
                        Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
                        Span::raw(" Back  "),
                    ]);
                }
            }
            View::Runner => {
                spans.extend(vec![
                    Span::styled("p", Style::default().fg(Color::Green)),
                    Span::raw(" Pass  "),
                    Span::styled("x", Style::default().fg(Color::Yellow)),
                    Span::raw(" Partial  "),
                    Span::styled("f", Style::default().fg(Color::Red)),
                    Span::raw(" Fail  "),
                    Span::styled("n", Style::default().fg(Color::Cyan)),
                    Span::raw(" Notes  "),
                    Span::styled("j/k", Style::default().fg(Color::Cyan)),
                    Span::raw(" Tests  "),
                    Span::styled("r", Style::default().fg(Color::Cyan)),
                    Span::raw(" Results  "),
                ]);
            }
            View::Results => {
                spans.extend(vec![
                    Span::styled("b", Style::default().fg(Color::Cyan)),
                    Span::raw(" Review  "),
                    Span::styled("<CR>", Style::default().fg(Color::Cyan)),
                    Span::raw(" Finish & archive  "),
                    Span::styled("s", Style::default().fg(Color::Cyan)),
                    Span::raw(" New assessment  "),
                ]);
            }
        }
        spans.extend(vec![
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" Quit"),
        ]);
        spans
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}
