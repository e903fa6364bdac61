use familytasks_core::filter::{AssigneeFilter, GroupKey};
use familytasks_core::PageState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// The assignee choice after the current one: "All Members" first, then every
/// assignee seen in the data. A filter naming someone no longer present
/// falls back to the start of the list.
pub fn next_assignee(page: &PageState) -> AssigneeFilter {
    let mut choices = vec![AssigneeFilter::All];
    choices.extend(page.assignee_options().into_iter().map(AssigneeFilter::Only));

    let current = &page.selection().assignee;
    match choices.iter().position(|c| c == current) {
        Some(i) => choices[(i + 1) % choices.len()].clone(),
        None => AssigneeFilter::All,
    }
}

pub fn next_grouping(current: Option<GroupKey>) -> Option<GroupKey> {
    match current {
        None => Some(GroupKey::Category),
        Some(GroupKey::Category) => Some(GroupKey::Assignee),
        Some(GroupKey::Assignee) => None,
    }
}

/// Side panel with the assignee select, category checkboxes and the grouping
/// switch. `category_cursor` is set while the checkboxes have focus.
pub fn render(frame: &mut Frame, area: Rect, page: &PageState, category_cursor: Option<usize>) {
    let border = if category_cursor.is_some() {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let heading = Style::default().fg(Color::DarkGray).bold();
    let key = Style::default().fg(Color::Yellow).bold();

    let mut lines = vec![
        Line::from(vec![Span::styled("Assignee ", heading), Span::styled("[a]", key)]),
        Line::from(format!("  {}", page.selection().assignee)),
        Line::raw(""),
        Line::from(vec![Span::styled("Categories ", heading), Span::styled("[c]", key)]),
    ];

    let categories = page.category_options();
    if categories.is_empty() {
        lines.push(Line::styled("  (none yet)", Style::default().fg(Color::DarkGray)));
    }
    for (i, category) in categories.iter().enumerate() {
        let mark = if page.selection().is_category_selected(category) {
            "[x]"
        } else {
            "[ ]"
        };
        let style = if category_cursor == Some(i) {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("  {mark} {category}"), style));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("Group by ", heading),
        Span::styled("[g]", key),
    ]));
    let grouping = page.grouping().map(|k| k.display_name()).unwrap_or("None");
    lines.push(Line::from(format!("  {grouping}")));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
