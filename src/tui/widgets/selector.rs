use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::tui::{App, SelectorStep};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_categories(f, app, chunks[0]);
    draw_detail(f, app, chunks[1]);
}

fn draw_categories(f: &mut Frame, app: &App, area: Rect) {
    let active = app.selector_step == SelectorStep::Category;

    let items: Vec<ListItem> = app
        .categories
        .items
        .iter()
        .map(|c| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    c.name.clone(),
                    Style::default().fg(Color::White),
                )),
                Line::from(Span::styled(
                    format!("  {}", c.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let border_color = if active { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 1. Tool category ")
        .title_style(Style::default().fg(border_color));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    state.select(app.categories.selected);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    match app.selector_step {
        SelectorStep::Category => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Pick the category that best matches the AI tool",
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    "you want to vet, then choose a use case.",
                    Style::default().fg(Color::Gray),
                )),
            ])
            .block(Block::default().borders(Borders::ALL).title(" 2. Use case "));
            f.render_widget(hint, area);
        }
        SelectorStep::UseCase | SelectorStep::Name => {
            draw_use_cases(f, app, area);
        }
    }
}

fn draw_use_cases(f: &mut Frame, app: &App, area: Rect) {
    let active = app.selector_step == SelectorStep::UseCase;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = app
        .use_cases
        .items
        .iter()
        .map(|u| ListItem::new(Line::from(u.clone())))
        .collect();

    let border_color = if active { Color::Cyan } else { Color::DarkGray };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 2. Use case ")
                .title_style(Style::default().fg(border_color)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(app.use_cases.selected);
    f.render_stateful_widget(list, chunks[0], &mut state);

    // Name entry lights up once a use case is picked
    let name_active = app.selector_step == SelectorStep::Name;
    let name_text = if app.name_input.is_empty() && !name_active {
        Span::styled("press Enter to name the tool", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(app.name_input.clone(), Style::default().fg(Color::White))
    };
    let name = Paragraph::new(Line::from(name_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 3. Tool name ")
            .title_style(Style::default().fg(if name_active {
                Color::Cyan
            } else {
                Color::DarkGray
            })),
    );
    f.render_widget(name, chunks[1]);
}
