//! Member list screen rendering
//!
//! Renders the main list view showing every member of the team directory
//! with their handle and location, plus a status line reflecting the
//! current load cycle.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Member;

/// Builds the status line under the title: fetch progress, last refresh,
/// or the latest load error
fn status_text(app: &App) -> (String, Color) {
    if let Some(error) = &app.load_error {
        return (format!("Error fetching team members: {}", error), Color::Red);
    }
    if app.is_fetching() {
        return ("Refreshing...".to_string(), Color::Yellow);
    }
    match &app.last_refresh {
        Some(at) => (
            format!("Updated {}", at.format("%H:%M:%S")),
            Color::DarkGray,
        ),
        None => (String::new(), Color::DarkGray),
    }
}

/// Builds one list line for a member
fn member_line(member: &Member, app: &App, selected: bool) -> Line<'static> {
    let marker = if selected { "\u{25B8} " } else { "  " };

    let name_style = if selected {
        Style::default()
            .fg(app.styles.name)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.styles.name)
    };

    let mut spans = vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(member.username.clone(), name_style),
        Span::raw("  "),
        Span::styled(
            member.short_address(),
            Style::default().fg(app.styles.address),
        ),
    ];

    if selected {
        spans.push(Span::styled(
            format!("  <{}>", member.email),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

/// Renders the member list screen
///
/// # Arguments
/// * `frame` - The ratatui frame to render into
/// * `app` - The application state
pub fn render_member_list(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + status
            Constraint::Min(0),    // Member list
            Constraint::Length(2), // Key hints
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_members(frame, chunks[1], app);
    render_footer(frame, chunks[2]);
}

/// Renders the bordered title block with the status line
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let (status, status_color) = status_text(app);

    let header = Paragraph::new(Line::from(Span::styled(
        status,
        Style::default().fg(status_color),
    )))
    .block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .title(Span::styled(
                " Team Members ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    frame.render_widget(header, area);
}

/// Renders the member lines, or a placeholder when the list is empty
fn render_members(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::LEFT | Borders::RIGHT);

    if app.members.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No team members to show",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let lines: Vec<Line> = app
        .members
        .iter()
        .enumerate()
        .map(|(i, member)| member_line(member, app, i == app.selected_index))
        .collect();

    let list = Paragraph::new(lines).block(block);
    frame.render_widget(list, area);
}

/// Renders the key hints at the bottom of the screen
fn render_footer(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(Line::from(Span::styled(
        " \u{2191}\u{2193} select | Enter details | r refresh | n/a card colors | q quit",
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT));

    frame.render_widget(hints, area);
}
