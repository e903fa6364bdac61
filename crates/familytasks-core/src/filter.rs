//! Filtering and grouping of the in-memory task collection.
//!
//! Everything here is a pure function of the current task list. Option
//! vocabularies (assignees, categories) are recomputed from data on every
//! call; there is no registry of known values.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Wire value selecting every assignee.
pub const ALL_ASSIGNEES: &str = "all";

/// Single-select assignee filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssigneeFilter {
    #[default]
    All,
    Only(String),
}

impl AssigneeFilter {
    pub fn matches(&self, assignee: &str) -> bool {
        match self {
            AssigneeFilter::All => true,
            AssigneeFilter::Only(name) => name == assignee,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssigneeFilter::All => ALL_ASSIGNEES,
            AssigneeFilter::Only(name) => name,
        }
    }
}

impl From<String> for AssigneeFilter {
    fn from(value: String) -> Self {
        if value == ALL_ASSIGNEES {
            AssigneeFilter::All
        } else {
            AssigneeFilter::Only(value)
        }
    }
}

impl From<&str> for AssigneeFilter {
    fn from(value: &str) -> Self {
        AssigneeFilter::from(value.to_string())
    }
}

impl From<AssigneeFilter> for String {
    fn from(value: AssigneeFilter) -> Self {
        match value {
            AssigneeFilter::All => ALL_ASSIGNEES.to_string(),
            AssigneeFilter::Only(name) => name,
        }
    }
}

impl fmt::Display for AssigneeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssigneeFilter::All => f.write_str("All Members"),
            AssigneeFilter::Only(name) => f.write_str(name),
        }
    }
}

/// Active filter state: one assignee (or all) and an inclusive-OR set of
/// categories. An empty category set lets every category through.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskSelection {
    pub assignee: AssigneeFilter,
    pub categories: BTreeSet<String>,
}

impl TaskSelection {
    pub fn matches(&self, task: &Task) -> bool {
        self.assignee.matches(&task.assignee)
            && (self.categories.is_empty() || self.categories.contains(&task.category))
    }

    /// Checkbox semantics: selected categories are removed, others added.
    pub fn toggle_category(&mut self, category: &str) {
        if !self.categories.remove(category) {
            self.categories.insert(category.to_string());
        }
    }

    pub fn is_category_selected(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}

/// Tasks passing `selection`, in their original relative order.
pub fn select<'a>(tasks: &'a [Task], selection: &TaskSelection) -> Vec<&'a Task> {
    tasks.iter().filter(|t| selection.matches(t)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Category,
    Assignee,
}

impl GroupKey {
    pub fn value_of<'a>(&self, task: &'a Task) -> &'a str {
        match self {
            GroupKey::Category => &task.category,
            GroupKey::Assignee => &task.assignee,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GroupKey::Category => "Category",
            GroupKey::Assignee => "Assignee",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskGroup<'a> {
    pub key: String,
    pub tasks: Vec<&'a Task>,
}

/// Buckets `tasks` by `key`. Groups appear in the order their first task was
/// encountered and tasks keep their relative order inside each group.
pub fn group_by<'a, I>(tasks: I, key: GroupKey) -> Vec<TaskGroup<'a>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut groups: Vec<TaskGroup<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for task in tasks {
        let value = key.value_of(task);
        match index.get(value) {
            Some(&i) => groups[i].tasks.push(task),
            None => {
                index.insert(value, groups.len());
                groups.push(TaskGroup {
                    key: value.to_string(),
                    tasks: vec![task],
                });
            }
        }
    }

    groups
}

pub fn distinct_assignees(tasks: &[Task]) -> Vec<String> {
    distinct_by(tasks.iter().map(|t| t.assignee.as_str()))
}

/// Categories observed in `tasks`. Uncategorized tasks do not contribute an
/// empty option.
pub fn distinct_categories(tasks: &[Task]) -> Vec<String> {
    distinct_by(
        tasks
            .iter()
            .map(|t| t.category.as_str())
            .filter(|c| !c.is_empty()),
    )
}

fn distinct_by<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Which groups are currently expanded. Tied to a grouping key and cleared
/// whenever that key changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpandedGroups {
    key: Option<GroupKey>,
    expanded: BTreeSet<String>,
}

impl ExpandedGroups {
    pub fn key(&self) -> Option<GroupKey> {
        self.key
    }

    /// Switch grouping. Returns `true` when the expanded set was reset.
    pub fn set_key(&mut self, key: Option<GroupKey>) -> bool {
        if self.key == key {
            return false;
        }
        self.key = key;
        self.expanded.clear();
        true
    }

    pub fn toggle(&mut self, group: &str) {
        if !self.expanded.remove(group) {
            self.expanded.insert(group.to_string());
        }
    }

    pub fn is_expanded(&self, group: &str) -> bool {
        self.expanded.contains(group)
    }

    pub fn expanded(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::task;

    fn family() -> Vec<Task> {
        vec![
            task(1, "Math worksheet", "Tommy", "Homework"),
            task(2, "Clean room", "Sarah", "Chores"),
            task(3, "Soccer practice", "Tommy", "Activities"),
            task(4, "Laundry", "Mom", "Chores"),
            task(5, "Read chapter", "Sarah", "Homework"),
        ]
    }

    fn ids(tasks: &[&Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn default_selection_passes_everything() {
        let tasks = family();
        let out = select(&tasks, &TaskSelection::default());
        assert_eq!(ids(&out), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn assignee_filter_is_single_select() {
        let tasks = family();
        let sel = TaskSelection {
            assignee: "Tommy".into(),
            ..Default::default()
        };
        assert_eq!(ids(&select(&tasks, &sel)), vec![1, 3]);
    }

    #[test]
    fn category_filter_is_inclusive_or() {
        let tasks = family();
        let mut sel = TaskSelection::default();
        sel.toggle_category("Chores");
        sel.toggle_category("Activities");
        assert_eq!(ids(&select(&tasks, &sel)), vec![2, 3, 4]);
    }

    #[test]
    fn assignee_and_category_combine() {
        let tasks = family();
        let mut sel = TaskSelection {
            assignee: "Sarah".into(),
            ..Default::default()
        };
        sel.toggle_category("Homework");
        assert_eq!(ids(&select(&tasks, &sel)), vec![5]);
    }

    #[test]
    fn toggling_category_twice_clears_it() {
        let mut sel = TaskSelection::default();
        sel.toggle_category("Chores");
        assert!(sel.is_category_selected("Chores"));
        sel.toggle_category("Chores");
        assert!(sel.categories.is_empty());
    }

    #[test]
    fn unknown_assignee_selects_nothing() {
        let tasks = family();
        let sel = TaskSelection {
            assignee: "Grandpa".into(),
            ..Default::default()
        };
        assert!(select(&tasks, &sel).is_empty());
    }

    #[test]
    fn all_wire_value_round_trips() {
        assert_eq!(AssigneeFilter::from("all"), AssigneeFilter::All);
        let json = serde_json::to_string(&AssigneeFilter::All).unwrap();
        assert_eq!(json, "\"all\"");
        let sel: TaskSelection =
            serde_json::from_str(r#"{"assignee":"Mom","categories":[]}"#).unwrap();
        assert_eq!(sel.assignee, AssigneeFilter::Only("Mom".into()));
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let tasks = vec![
            task(1, "Spelling", "Tommy", "School"),
            task(2, "Clean room", "Sarah", "Chores"),
        ];
        let groups = group_by(&tasks, GroupKey::Category);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "School");
        assert_eq!(ids(&groups[0].tasks), vec![1]);
        assert_eq!(groups[1].key, "Chores");
        assert_eq!(ids(&groups[1].tasks), vec![2]);
    }

    #[test]
    fn group_by_assignee_collects_members() {
        let tasks = family();
        let groups = group_by(&tasks, GroupKey::Assignee);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Tommy", "Sarah", "Mom"]);
        assert_eq!(ids(&groups[1].tasks), vec![2, 5]);
    }

    #[test]
    fn group_by_accepts_a_selection() {
        let tasks = family();
        let sel = TaskSelection {
            assignee: "Sarah".into(),
            ..Default::default()
        };
        let groups = group_by(select(&tasks, &sel), GroupKey::Category);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Chores", "Homework"]);
    }

    #[test]
    fn distinct_values_are_unique_and_first_seen() {
        let tasks = family();
        assert_eq!(distinct_assignees(&tasks), vec!["Tommy", "Sarah", "Mom"]);
        assert_eq!(
            distinct_categories(&tasks),
            vec!["Homework", "Chores", "Activities"]
        );
    }

    #[test]
    fn empty_category_is_not_an_option() {
        let tasks = vec![task(1, "Nap", "Dad", ""), task(2, "Bake", "Mom", "Other")];
        assert_eq!(distinct_categories(&tasks), vec!["Other"]);
    }

    #[test]
    fn empty_assignee_is_still_listed() {
        let tasks = vec![task(1, "Nap", "", "Chores"), task(2, "Bake", "Mom", "")];
        assert_eq!(distinct_assignees(&tasks), vec!["", "Mom"]);
        let groups = group_by(&tasks, GroupKey::Assignee);
        assert_eq!(groups[0].key, "");
    }

    #[test]
    fn distinct_lists_track_current_data() {
        let mut tasks = family();
        tasks.retain(|t| t.assignee != "Mom");
        assert_eq!(distinct_assignees(&tasks), vec!["Tommy", "Sarah"]);
    }

    #[test]
    fn expanded_groups_reset_on_key_change() {
        let mut groups = ExpandedGroups::default();
        assert!(groups.set_key(Some(GroupKey::Category)));
        groups.toggle("Chores");
        assert!(groups.is_expanded("Chores"));

        assert!(!groups.set_key(Some(GroupKey::Category)));
        assert!(groups.is_expanded("Chores"));

        assert!(groups.set_key(Some(GroupKey::Assignee)));
        assert!(!groups.is_expanded("Chores"));
        assert_eq!(groups.expanded().count(), 0);
    }

    #[test]
    fn expanded_toggle_collapses() {
        let mut groups = ExpandedGroups::default();
        groups.toggle("Tommy");
        groups.toggle("Tommy");
        assert!(!groups.is_expanded("Tommy"));
    }
}
