use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use familytasks_core::form::FormField;
use familytasks_core::page::route_for;
use familytasks_core::{
    Command, Identity, Intent, Notification, NotificationLog, PageState, Route, TaskForm, TaskId,
    View,
};
use familytasks_service::BlockingTaskStore;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::components::task_list::{self, Row};
use crate::components::{centered_rect, filter_panel, header, task_form};

/// What the app is currently doing
#[derive(Debug, Clone)]
pub enum Mode {
    /// No session; typing an API key
    Login {
        input: String,
        error: Option<String>,
    },
    /// Browsing the task list
    Normal,
    /// Create/edit dialog open
    Form { form: TaskForm, field: FormField },
    /// Category checkboxes have focus
    CategoryPick { cursor: usize },
}

pub struct App {
    base_url: String,
    store: BlockingTaskStore,
    notifications: Arc<NotificationLog>,
    identity: Option<Identity>,
    page: PageState,
    mode: Mode,
    cursor: usize,
    status_message: Option<Notification>,
}

impl App {
    /// Connect to the server at `base_url` and try to open a session. A
    /// rejected session lands on the login screen rather than failing.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let notifications = Arc::new(NotificationLog::new());
        let store = BlockingTaskStore::http(base_url, api_key, notifications.clone())?;
        let mut app = Self {
            base_url: base_url.to_string(),
            store,
            notifications,
            identity: None,
            page: PageState::new(),
            mode: Mode::Login {
                input: String::new(),
                error: None,
            },
            cursor: 0,
            status_message: None,
        };
        app.sign_in();
        Ok(app)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn route(&self) -> Route {
        route_for(self.identity.as_ref())
    }

    pub fn status_message(&self) -> Option<&Notification> {
        self.status_message.as_ref()
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::Login { .. } | Mode::Form { .. })
    }

    /// Rows of the task list as currently rendered.
    pub fn rows(&self) -> Vec<Row<'_>> {
        task_list::rows(&self.page)
    }

    pub fn selected_row(&self) -> Option<Row<'_>> {
        self.rows().into_iter().nth(self.cursor)
    }

    fn selected_task_id(&self) -> Option<TaskId> {
        self.selected_row().and_then(|r| r.task()).map(|t| t.id)
    }

    fn sign_in(&mut self) {
        match self.store.session() {
            Ok(identity) => {
                tracing::info!(user = %identity.name, "signed in");
                self.identity = Some(identity);
            }
            Err(e) => {
                tracing::warn!(error = %e, "no session");
                self.identity = None;
                self.mode = Mode::Login {
                    input: String::new(),
                    error: Some(e.to_string()),
                };
            }
        }

        if self.route() == Route::Tasks {
            self.page = PageState::new();
            self.cursor = 0;
            self.mode = Mode::Normal;
            self.reload();
        }
    }

    fn sign_in_with(&mut self, key: &str) {
        let key = key.trim();
        let api_key = (!key.is_empty()).then(|| key.to_string());
        match BlockingTaskStore::http(&self.base_url, api_key, self.notifications.clone()) {
            Ok(store) => {
                self.store = store;
                self.sign_in();
            }
            Err(e) => {
                self.mode = Mode::Login {
                    input: String::new(),
                    error: Some(e.to_string()),
                };
            }
        }
    }

    fn reload(&mut self) {
        self.store.refresh();
        self.sync_from_store();
    }

    /// Hand the store's current collection to the page and surface whatever
    /// the store reported along the way.
    fn sync_from_store(&mut self) {
        let ticket = self.page.begin_load();
        self.page.finish_load(ticket, self.store.tasks().to_vec());
        self.clamp_cursor();
        if let Some(last) = self.notifications.drain().pop() {
            self.status_message = Some(last);
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn dispatch(&mut self, intent: Intent) {
        if let Some(command) = self.page.apply(intent) {
            self.run(command);
        }
    }

    fn run(&mut self, command: Command) {
        match command {
            Command::Toggle(id) => {
                if let Err(e) = self.store.toggle_completion(id) {
                    tracing::debug!(task_id = id, error = %e, "toggle not applied");
                }
                self.sync_from_store();
            }
            Command::Save(draft) => match self.store.save(&draft) {
                Ok(_) => {
                    self.page.apply(Intent::SaveSucceeded);
                    self.mode = Mode::Normal;
                    self.sync_from_store();
                }
                Err(e) => {
                    tracing::debug!(error = %e, "save not applied");
                    self.page.apply(Intent::SaveFailed);
                    if let Some(last) = self.notifications.drain().pop() {
                        self.status_message = Some(last);
                    }
                }
            },
            Command::Reload => self.reload(),
            Command::SignOut => {
                tracing::info!("signed out");
                self.page.unmount();
                self.identity = None;
                self.cursor = 0;
                self.mode = Mode::Login {
                    input: String::new(),
                    error: None,
                };
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match &self.mode.clone() {
            Mode::Login { input, .. } => self.handle_login(key, input.clone()),
            Mode::Normal => self.handle_normal(key),
            Mode::Form { form, field } => self.handle_form(key, form.clone(), *field),
            Mode::CategoryPick { cursor } => self.handle_category_pick(key, *cursor),
        }
    }

    fn handle_login(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Enter => self.sign_in_with(&input),
            KeyCode::Esc => {
                self.mode = Mode::Login {
                    input: String::new(),
                    error: None,
                };
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::Login { input, error: None };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::Login { input, error: None };
            }
            _ => {}
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor + 1 < self.rows().len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Char('n') => {
                self.page.apply(Intent::NewTask);
                if *self.page.view() == View::FormCreate {
                    self.mode = Mode::Form {
                        form: TaskForm::new(),
                        field: FormField::Title,
                    };
                }
            }
            KeyCode::Char('e') => self.edit_selected(),
            KeyCode::Enter => {
                let group = match self.selected_row() {
                    Some(Row::Group { key, .. }) => Some(key),
                    _ => None,
                };
                match group {
                    Some(key) => {
                        self.page.apply(Intent::ToggleGroup(key));
                        self.clamp_cursor();
                    }
                    None => self.edit_selected(),
                }
            }
            KeyCode::Char(' ') => {
                let selected = self.selected_task_id();
                if let Some(id) = selected {
                    self.dispatch(Intent::Toggle(id));
                }
            }
            KeyCode::Char('a') => {
                let next = filter_panel::next_assignee(&self.page);
                self.page.apply(Intent::SetAssigneeFilter(next));
                self.clamp_cursor();
            }
            KeyCode::Char('c') => {
                self.mode = Mode::CategoryPick { cursor: 0 };
            }
            KeyCode::Char('g') => {
                let next = filter_panel::next_grouping(self.page.grouping());
                self.page.apply(Intent::SetGrouping(next));
                self.cursor = 0;
            }
            KeyCode::Char('r') => self.dispatch(Intent::Refresh),
            KeyCode::Char('o') => self.dispatch(Intent::SignOut),
            _ => {}
        }
    }

    fn edit_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        self.page.apply(Intent::Edit(id));
        if let View::FormEdit { task } = self.page.view() {
            self.mode = Mode::Form {
                form: TaskForm::edit(task),
                field: FormField::Title,
            };
        }
    }

    fn handle_form(&mut self, key: KeyEvent, mut form: TaskForm, field: FormField) {
        match key.code {
            KeyCode::Esc => {
                self.page.apply(Intent::Cancel);
                self.mode = Mode::Normal;
                return;
            }
            KeyCode::Enter => {
                let draft = form.submit();
                self.mode = Mode::Form { form, field };
                if let Ok(draft) = draft {
                    self.dispatch(Intent::Submit(draft));
                }
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.mode = Mode::Form {
                    form,
                    field: field.next(),
                };
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.mode = Mode::Form {
                    form,
                    field: field.prev(),
                };
                return;
            }
            KeyCode::Backspace => {
                if let Some(text) = form.text_mut(field) {
                    text.pop();
                }
            }
            KeyCode::Right => form.cycle(field, true),
            KeyCode::Left => form.cycle(field, false),
            KeyCode::Char(c) if field.is_text() => {
                if let Some(text) = form.text_mut(field) {
                    text.push(c);
                }
            }
            KeyCode::Char(' ') => form.cycle(field, true),
            _ => {}
        }
        self.mode = Mode::Form { form, field };
    }

    fn handle_category_pick(&mut self, key: KeyEvent, cursor: usize) {
        let categories = self.page.category_options();
        match key.code {
            KeyCode::Esc | KeyCode::Char('c') => self.mode = Mode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                if cursor + 1 < categories.len() {
                    self.mode = Mode::CategoryPick { cursor: cursor + 1 };
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.mode = Mode::CategoryPick {
                    cursor: cursor.saturating_sub(1),
                };
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(category) = categories.get(cursor) {
                    self.page.apply(Intent::ToggleCategory(category.clone()));
                    self.clamp_cursor();
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if let Mode::Login { input, error } = &self.mode {
            self.render_login(frame, input, error.as_deref(), area);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        header::render(frame, layout[0], self.identity.as_ref());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(layout[1]);

        let category_cursor = match self.mode {
            Mode::CategoryPick { cursor } => Some(cursor),
            _ => None,
        };
        filter_panel::render(frame, body[0], &self.page, category_cursor);
        task_list::render(frame, body[1], &self.page, self.cursor);
        self.render_status_bar(frame, layout[2]);

        if let Mode::Form { form, field } = &self.mode {
            task_form::render(frame, area, form, *field, self.page.is_saving());
        }
    }

    fn render_login(&self, frame: &mut Frame, input: &str, error: Option<&str>, area: Rect) {
        let popup = centered_rect(50, 40, area);
        frame.render_widget(Clear, popup);

        let masked = "*".repeat(input.chars().count());
        let mut lines = vec![
            Line::styled(
                "Welcome to Family Tasks",
                Style::default().bold().fg(Color::Cyan),
            ),
            Line::styled(
                "Sign in to manage your family's tasks",
                Style::default().fg(Color::DarkGray),
            ),
            Line::raw(""),
            Line::from(vec![Span::raw("API key: "), Span::raw(masked)]),
        ];
        if let Some(error) = error {
            lines.push(Line::raw(""));
            lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Enter: sign in   Ctrl+C: quit",
            Style::default().fg(Color::Yellow),
        ));

        let block = Block::default()
            .title(" Sign In ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref note) = self.status_message {
            let color = if note.is_error() {
                Color::Red
            } else {
                Color::Green
            };
            let line = Line::from(Span::styled(
                format!(" {}: {}", note.title, note.description),
                Style::default().fg(color),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match &self.mode {
            Mode::Normal => vec![
                ("q", "quit"),
                ("j/k", "move"),
                ("space", "done"),
                ("e", "edit"),
                ("n", "new"),
                ("a", "assignee"),
                ("c", "categories"),
                ("g", "group"),
                ("r", "refresh"),
                ("o", "sign out"),
            ],
            Mode::Form { .. } => vec![
                ("Tab", "next field"),
                ("←/→", "choose"),
                ("Enter", "save"),
                ("Esc", "cancel"),
            ],
            Mode::CategoryPick { .. } => {
                vec![("j/k", "move"), ("space", "toggle"), ("Esc", "back")]
            }
            Mode::Login { .. } => vec![],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }
}
