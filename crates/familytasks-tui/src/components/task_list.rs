use familytasks_core::filter::GroupKey;
use familytasks_core::task::{Priority, Task};
use familytasks_core::PageState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// One selectable line of the task list.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<'a> {
    Group {
        key: String,
        count: usize,
        expanded: bool,
    },
    Task(&'a Task),
}

impl<'a> Row<'a> {
    pub fn task(&self) -> Option<&'a Task> {
        match self {
            Row::Task(task) => Some(task),
            Row::Group { .. } => None,
        }
    }
}

/// Flatten the page into rows. Ungrouped pages list every visible task;
/// grouped pages list one header per group followed by its tasks when the
/// group is expanded.
pub fn rows(page: &PageState) -> Vec<Row<'_>> {
    let Some(groups) = page.grouped() else {
        return page.visible().into_iter().map(Row::Task).collect();
    };

    let mut out = Vec::new();
    for group in groups {
        let expanded = page.groups().is_expanded(&group.key);
        out.push(Row::Group {
            key: group.key.clone(),
            count: group.tasks.len(),
            expanded,
        });
        if expanded {
            out.extend(group.tasks.into_iter().map(Row::Task));
        }
    }
    out
}

/// Header text for a group. Empty keys get a label fitting the grouping.
pub fn group_label(grouping: GroupKey, key: &str) -> &str {
    match (key.is_empty(), grouping) {
        (false, _) => key,
        (true, GroupKey::Category) => "Uncategorized",
        (true, GroupKey::Assignee) => "Unassigned",
    }
}

pub fn render(frame: &mut Frame, area: Rect, page: &PageState, selected: usize) {
    let title = match page.grouping() {
        Some(key) => format!(" Tasks by {} ", key.display_name()),
        None => format!(" Tasks ({}) ", page.visible().len()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if page.is_loading() {
        frame.render_widget(Paragraph::new(" Loading tasks...").block(block), area);
        return;
    }

    let rows = rows(page);
    if rows.is_empty() {
        let hint = if page.tasks().is_empty() {
            " No tasks yet. Press n to add one."
        } else {
            " No tasks match the current filters."
        };
        frame.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let grouping = page.grouping().unwrap_or(GroupKey::Category);
    let items: Vec<ListItem> = rows.iter().map(|row| row_item(grouping, row)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).bold())
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(selected.min(rows.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn row_item<'a>(grouping: GroupKey, row: &Row<'a>) -> ListItem<'a> {
    match row {
        Row::Group {
            key,
            count,
            expanded,
        } => {
            let arrow = if *expanded { "▾" } else { "▸" };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{arrow} {}", group_label(grouping, key)),
                    Style::default().fg(Color::Magenta).bold(),
                ),
                Span::styled(format!(" ({count})"), Style::default().fg(Color::DarkGray)),
            ]))
        }
        Row::Task(task) => task_card(task),
    }
}

/// Two-line card: check box, title and priority on top, assignee and
/// category underneath.
pub fn task_card(task: &Task) -> ListItem<'_> {
    let (check, title_style) = if task.completed {
        (
            Span::styled("[✓] ", Style::default().fg(Color::Green)),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        (Span::raw("[ ] "), Style::default())
    };

    let mut detail = format!("    Assigned to: {}", task.assignee);
    if !task.category.is_empty() {
        detail.push_str(&format!(" · {}", task.category));
    }

    ListItem::new(vec![
        Line::from(vec![
            check,
            Span::styled(task.title.as_str(), title_style),
            Span::raw(" "),
            Span::styled(task.priority.symbol(), priority_color(task.priority)),
        ]),
        Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))),
    ])
}

pub fn priority_color(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red).bold(),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Blue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use familytasks_core::Intent;

    fn make_task(id: i64, assignee: &str, category: &str) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: None,
            assignee: assignee.to_string(),
            priority: Priority::Medium,
            category: category.to_string(),
            completed: false,
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_page() -> PageState {
        let mut page = PageState::new();
        let ticket = page.begin_load();
        page.finish_load(
            ticket,
            vec![
                make_task(1, "Tommy", "Homework"),
                make_task(2, "Sarah", "Chores"),
                make_task(3, "Tommy", "Chores"),
            ],
        );
        page
    }

    fn task_ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().filter_map(|r| r.task()).map(|t| t.id).collect()
    }

    #[test]
    fn ungrouped_rows_are_visible_tasks() {
        let mut page = make_page();
        assert_eq!(task_ids(&rows(&page)), vec![1, 2, 3]);

        page.apply(Intent::SetAssigneeFilter("Tommy".into()));
        assert_eq!(task_ids(&rows(&page)), vec![1, 3]);
    }

    #[test]
    fn grouped_rows_start_collapsed() {
        let mut page = make_page();
        page.apply(Intent::SetGrouping(Some(GroupKey::Assignee)));
        let rows = rows(&page);
        assert_eq!(rows.len(), 2);
        assert!(matches!(&rows[0], Row::Group { key, count: 2, expanded: false } if key == "Tommy"));
        assert!(matches!(&rows[1], Row::Group { key, count: 1, .. } if key == "Sarah"));
    }

    #[test]
    fn expanded_group_lists_its_tasks() {
        let mut page = make_page();
        page.apply(Intent::SetGrouping(Some(GroupKey::Category)));
        page.apply(Intent::ToggleGroup("Chores".into()));
        let rows = rows(&page);
        assert_eq!(rows.len(), 4);
        assert!(matches!(&rows[1], Row::Group { key, expanded: true, .. } if key == "Chores"));
        assert_eq!(task_ids(&rows), vec![2, 3]);
    }

    #[test]
    fn empty_group_key_is_labelled_per_grouping() {
        assert_eq!(group_label(GroupKey::Category, ""), "Uncategorized");
        assert_eq!(group_label(GroupKey::Assignee, ""), "Unassigned");
        assert_eq!(group_label(GroupKey::Category, "Chores"), "Chores");
        assert_eq!(group_label(GroupKey::Assignee, "Mom"), "Mom");
    }
}
