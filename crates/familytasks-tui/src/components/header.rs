use familytasks_core::identity::Identity;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

pub const TITLE: &str = "Family Tasks";
pub const SUBTITLE: &str = "Manage your family's daily activities";

/// Page header: app title on the left, signed-in user and the two page
/// actions on the right.
pub fn render(frame: &mut Frame, area: Rect, identity: Option<&Identity>) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(44)])
        .split(inner);

    let title = vec![
        Line::from(Span::styled(
            format!(" {TITLE}"),
            Style::default().bold().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            format!(" {SUBTITLE}"),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(title), halves[0]);

    let user = identity.map(|i| i.name.as_str()).unwrap_or("");
    let actions = vec![
        Line::from(Span::styled(user, Style::default().fg(Color::Yellow))),
        Line::from(vec![
            Span::styled("[n]", Style::default().fg(Color::Yellow).bold()),
            Span::raw(" Add Task  "),
            Span::styled("[o]", Style::default().fg(Color::Yellow).bold()),
            Span::raw(" Sign Out "),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(actions).alignment(Alignment::Right),
        halves[1],
    );
}
