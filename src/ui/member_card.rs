//! Member detail card UI
//!
//! Renders the detailed card for a single team member: contact details,
//! company, and full address in a bordered box layout.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Member;

/// Renders the member detail screen
///
/// # Arguments
/// * `frame` - The ratatui frame to render into
/// * `app` - The application state
/// * `member_id` - The directory id of the member to display
pub fn render(frame: &mut Frame, app: &App, member_id: u64) {
    let area = frame.area();

    let Some(member) = app.member_by_id(member_id) else {
        render_missing(frame, area);
        return;
    };

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", member.name),
            Style::default()
                .fg(app.styles.name)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Contact
            Constraint::Length(4), // Company
            Constraint::Length(5), // Address
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Key hints
        ])
        .split(inner_area);

    render_contact(frame, chunks[0], member);
    render_company(frame, chunks[1], member);
    render_address(frame, chunks[2], member, app);
    render_footer(frame, chunks[4]);
}

/// Label/value line used by all card sections
fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

/// Renders username, email, phone, and website
fn render_contact(frame: &mut Frame, area: Rect, member: &Member) {
    let lines = vec![
        section_header("Contact"),
        field_line("Handle", member.username.clone()),
        field_line("Email", member.email.clone()),
        field_line("Phone", member.phone.clone()),
        field_line("Website", member.website.clone()),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the employer block
fn render_company(frame: &mut Frame, area: Rect, member: &Member) {
    let lines = vec![
        section_header("Company"),
        field_line("Name", member.company.name.clone()),
        field_line("Motto", member.company.catch_phrase.clone()),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the full postal address, styled with the address color choice
fn render_address(frame: &mut Frame, area: Rect, member: &Member, app: &App) {
    let address = &member.address;
    let style = Style::default().fg(app.styles.address);

    let lines = vec![
        section_header("Address"),
        Line::from(Span::styled(
            format!("{}, {}", address.street, address.suite),
            style,
        )),
        Line::from(Span::styled(
            format!("{} {}", address.city, address.zipcode),
            style,
        )),
        Line::from(Span::styled(
            format!("({}, {})", address.geo.lat, address.geo.lng),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// Section title line
fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Renders the key hints at the bottom of the card
fn render_footer(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(Line::from(Span::styled(
        "Esc back | n/a card colors | q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(hints, area);
}

/// Shown when the member id is not in the current list
fn render_missing(frame: &mut Frame, area: Rect) {
    let message = Paragraph::new(Line::from(Span::styled(
        "Member not found - press Esc to return",
        Style::default().fg(Color::Red),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(message, area);
}
