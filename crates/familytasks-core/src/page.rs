//! Page controller for the task list screen.
//!
//! `PageState` owns every piece of transient UI state (open dialog, active
//! filters, expanded groups, the current task collection). User actions arrive
//! as [`Intent`]s; `apply` updates the state and returns the [`Command`] the
//! runtime has to carry out against the store, if any. Outcomes of those
//! commands come back as further intents (`SaveSucceeded`, `SaveFailed`) or
//! through `finish_load`.

use serde::{Deserialize, Serialize};

use crate::filter::{
    distinct_assignees, distinct_categories, group_by, select, AssigneeFilter, ExpandedGroups,
    GroupKey, TaskGroup, TaskSelection,
};
use crate::identity::Identity;
use crate::task::{Task, TaskDraft, TaskId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Viewing,
    FormCreate,
    FormEdit { task: Task },
}

impl View {
    pub fn is_form_open(&self) -> bool {
        !matches!(self, View::Viewing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Tasks,
}

/// Where the page goes once it is ready to render.
pub fn route_for(identity: Option<&Identity>) -> Route {
    match identity {
        Some(_) => Route::Tasks,
        None => Route::Login,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    NewTask,
    Edit(TaskId),
    Cancel,
    Submit(TaskDraft),
    Toggle(TaskId),
    SaveSucceeded,
    SaveFailed,
    SetAssigneeFilter(AssigneeFilter),
    ToggleCategory(String),
    SetGrouping(Option<GroupKey>),
    ToggleGroup(String),
    Refresh,
    SignOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle(TaskId),
    Save(TaskDraft),
    Reload,
    SignOut,
}

/// Handed out by `begin_load`; only the newest ticket may replace the
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    view: View,
    selection: TaskSelection,
    groups: ExpandedGroups,
    tasks: Vec<Task>,
    loading: bool,
    saving: bool,
    #[serde(skip)]
    load_epoch: u64,
    #[serde(skip, default = "mounted_default")]
    mounted: bool,
}

fn mounted_default() -> bool {
    true
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

impl PageState {
    pub fn new() -> Self {
        Self {
            view: View::Viewing,
            selection: TaskSelection::default(),
            groups: ExpandedGroups::default(),
            tasks: Vec::new(),
            loading: false,
            saving: false,
            load_epoch: 0,
            mounted: true,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn selection(&self) -> &TaskSelection {
        &self.selection
    }

    pub fn groups(&self) -> &ExpandedGroups {
        &self.groups
    }

    pub fn grouping(&self) -> Option<GroupKey> {
        self.groups.key()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks passing the active filters, in collection order.
    pub fn visible(&self) -> Vec<&Task> {
        select(&self.tasks, &self.selection)
    }

    /// Visible tasks bucketed by the active grouping key, if one is set.
    pub fn grouped(&self) -> Option<Vec<TaskGroup<'_>>> {
        self.grouping()
            .map(|key| group_by(select(&self.tasks, &self.selection), key))
    }

    pub fn assignee_options(&self) -> Vec<String> {
        distinct_assignees(&self.tasks)
    }

    pub fn category_options(&self) -> Vec<String> {
        distinct_categories(&self.tasks)
    }

    pub fn apply(&mut self, intent: Intent) -> Option<Command> {
        match intent {
            Intent::NewTask => {
                if self.view == View::Viewing {
                    self.view = View::FormCreate;
                }
                None
            }
            Intent::Edit(id) => {
                if self.view == View::Viewing {
                    if let Some(task) = self.task(id).cloned() {
                        self.view = View::FormEdit { task };
                    }
                }
                None
            }
            Intent::Cancel => {
                if self.view.is_form_open() {
                    self.view = View::Viewing;
                    self.saving = false;
                }
                None
            }
            Intent::Submit(draft) => {
                if !self.view.is_form_open() || self.saving {
                    return None;
                }
                self.saving = true;
                Some(Command::Save(draft))
            }
            Intent::SaveSucceeded => {
                self.saving = false;
                self.view = View::Viewing;
                None
            }
            Intent::SaveFailed => {
                self.saving = false;
                None
            }
            Intent::Toggle(id) => {
                if self.view.is_form_open() || self.task(id).is_none() {
                    return None;
                }
                Some(Command::Toggle(id))
            }
            Intent::SetAssigneeFilter(filter) => {
                self.selection.assignee = filter;
                None
            }
            Intent::ToggleCategory(category) => {
                self.selection.toggle_category(&category);
                None
            }
            Intent::SetGrouping(key) => {
                self.groups.set_key(key);
                None
            }
            Intent::ToggleGroup(group) => {
                if self.grouping().is_some() {
                    self.groups.toggle(&group);
                }
                None
            }
            Intent::Refresh => Some(Command::Reload),
            Intent::SignOut => {
                *self = PageState {
                    load_epoch: self.load_epoch + 1,
                    ..PageState::new()
                };
                Some(Command::SignOut)
            }
        }
    }

    /// Mark a list fetch as outstanding. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_epoch += 1;
        self.loading = true;
        LoadTicket(self.load_epoch)
    }

    /// Replace the collection with a fetch result. Results for stale tickets
    /// or for an unmounted page are dropped; returns whether it was applied.
    pub fn finish_load(&mut self, ticket: LoadTicket, tasks: Vec<Task>) -> bool {
        if !self.mounted || ticket.0 != self.load_epoch {
            return false;
        }
        self.tasks = tasks;
        self.loading = false;
        true
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.loading = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}
