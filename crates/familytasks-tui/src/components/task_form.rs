use familytasks_core::form::FormField;
use familytasks_core::TaskForm;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_rect;
use super::task_list::priority_color;

/// Create/edit dialog. Validation messages render under the field they
/// belong to.
pub fn render(frame: &mut Frame, area: Rect, form: &TaskForm, focus: FormField, saving: bool) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);

    let title = if form.is_editing() {
        " Edit Task "
    } else {
        " Add New Task "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = Vec::new();
    for &field in FormField::ORDER {
        let focused = field == focus;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::styled(field.label(), label_style));
        lines.push(value_line(form, field, focused));
        if let Some(err) = form.errors().get(field) {
            lines.push(Line::styled(format!("  {err}"), Style::default().fg(Color::Red)));
        }
        lines.push(Line::raw(""));
    }

    let footer = if saving {
        "Saving..."
    } else if form.is_editing() {
        "Enter: Update Task   Esc: Cancel"
    } else {
        "Enter: Create Task   Esc: Cancel"
    };
    lines.push(Line::styled(footer, Style::default().fg(Color::Yellow)));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

fn value_line(form: &TaskForm, field: FormField, focused: bool) -> Line<'_> {
    let cursor = if focused && field.is_text() { "_" } else { "" };
    match field {
        FormField::Title => Line::raw(format!("  {}{cursor}", form.title)),
        FormField::Description if form.description.is_empty() && !focused => Line::styled(
            "  Add details about the task...",
            Style::default().fg(Color::DarkGray),
        ),
        FormField::Description => Line::raw(format!("  {}{cursor}", form.description)),
        FormField::Assignee => choice_line(&form.assignee, "Select family member", focused),
        FormField::Category => choice_line(&form.category, "Select category", focused),
        FormField::Priority => Line::from(vec![
            Span::raw(if focused { "< " } else { "  " }),
            Span::styled(form.priority.as_str(), priority_color(form.priority)),
            Span::raw(if focused { " >" } else { "" }),
        ]),
    }
}

fn choice_line<'a>(value: &'a str, placeholder: &'a str, focused: bool) -> Line<'a> {
    let (left, right) = if focused { ("< ", " >") } else { ("  ", "") };
    if value.is_empty() {
        Line::from(vec![
            Span::raw(left),
            Span::styled(placeholder, Style::default().fg(Color::DarkGray)),
            Span::raw(right),
        ])
    } else {
        Line::from(vec![Span::raw(left), Span::raw(value), Span::raw(right)])
    }
}
