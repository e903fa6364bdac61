use chrono::Utc;
use rusqlite::{params, Connection, Row};

use familytasks_core::task::{CreateTask, Priority, Task, TaskId, UpdateTask};

use super::super::{not_found, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let priority_str: String = row.get("priority")?;
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        assignee: row.get("assignee")?,
        priority: Priority::parse_str(&priority_str).unwrap_or_default(),
        category: row.get("category")?,
        completed: row.get("completed")?,
        owner_id: row.get("owner_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn select_task(conn: &Connection, owner_id: &str, id: TaskId) -> Result<Task, DbError> {
    conn.query_row(
        "SELECT * FROM tasks WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
        row_to_task,
    )
    .map_err(not_found(format!("task {id}")))
}

impl SqliteDatabase {
    /// Owner's tasks, most recently created first.
    pub fn list_tasks_sync(&self, owner_id: &str) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM tasks WHERE owner_id = ?1
                     ORDER BY created_at DESC, id DESC",
                )
                .to_db()?;
            let tasks = stmt
                .query_map(params![owner_id], row_to_task)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(tasks)
        })
    }

    pub fn get_task_sync(&self, owner_id: &str, id: TaskId) -> Result<Task, DbError> {
        self.with_conn(|conn| select_task(conn, owner_id, id))
    }

    pub fn create_task_sync(&self, owner_id: &str, input: &CreateTask) -> Result<Task, DbError> {
        input.validate()?;
        self.with_conn(|conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO tasks (
                    owner_id, title, description, assignee, priority, category,
                    completed, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)",
                params![
                    owner_id,
                    input.title,
                    input.description,
                    input.assignee,
                    input.priority.as_str(),
                    input.category,
                    now,
                    now,
                ],
            )
            .to_db()?;
            let id = conn.last_insert_rowid();
            tracing::debug!(task_id = id, owner_id, "inserted task");
            select_task(conn, owner_id, id)
        })
    }

    /// Replaces every editable field of the task in one statement.
    pub fn update_task_sync(
        &self,
        owner_id: &str,
        id: TaskId,
        update: &UpdateTask,
    ) -> Result<Task, DbError> {
        update.validate()?;
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE tasks SET
                        title = ?1, description = ?2, assignee = ?3, priority = ?4,
                        category = ?5, completed = ?6, updated_at = ?7
                     WHERE id = ?8 AND owner_id = ?9",
                    params![
                        update.title,
                        update.description,
                        update.assignee,
                        update.priority.as_str(),
                        update.category,
                        update.completed,
                        Utc::now(),
                        id,
                        owner_id,
                    ],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }
            select_task(conn, owner_id, id)
        })
    }

    pub fn set_task_completed_sync(
        &self,
        owner_id: &str,
        id: TaskId,
        completed: bool,
    ) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE tasks SET completed = ?1, updated_at = ?2
                     WHERE id = ?3 AND owner_id = ?4",
                    params![completed, Utc::now(), id, owner_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }
            select_task(conn, owner_id, id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SqliteDatabase, String) {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let user = db.ensure_user_sync("Mom").unwrap();
        (db, user.id)
    }

    fn input(title: &str, assignee: &str, category: &str) -> CreateTask {
        CreateTask {
            title: title.into(),
            description: None,
            assignee: assignee.into(),
            priority: Priority::Medium,
            category: category.into(),
        }
    }

    #[test]
    fn create_assigns_id_and_starts_open() {
        let (db, owner) = setup();
        let task = db
            .create_task_sync(&owner, &input("Clean room", "Sarah", "Chores"))
            .unwrap();
        assert!(task.id > 0);
        assert!(!task.completed);
        assert_eq!(task.owner_id, owner);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn ids_are_unique() {
        let (db, owner) = setup();
        let a = db.create_task_sync(&owner, &input("A", "Tommy", "")).unwrap();
        let b = db.create_task_sync(&owner, &input("B", "Tommy", "")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn blank_title_is_rejected() {
        let (db, owner) = setup();
        let err = db
            .create_task_sync(&owner, &input("  ", "Tommy", ""))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));
    }

    #[test]
    fn list_is_newest_first() {
        let (db, owner) = setup();
        for title in ["first", "second", "third"] {
            db.create_task_sync(&owner, &input(title, "Dad", "Other"))
                .unwrap();
        }
        let titles: Vec<String> = db
            .list_tasks_sync(&owner)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[test]
    fn tasks_are_scoped_to_owner() {
        let (db, owner) = setup();
        let other = db.ensure_user_sync("Dad").unwrap();
        let task = db
            .create_task_sync(&owner, &input("Secret", "Mom", ""))
            .unwrap();

        assert!(db.list_tasks_sync(&other.id).unwrap().is_empty());
        assert!(matches!(
            db.get_task_sync(&other.id, task.id),
            Err(DbError::NotFound(_))
        ));
        assert!(matches!(
            db.set_task_completed_sync(&other.id, task.id, true),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn update_replaces_all_fields() {
        let (db, owner) = setup();
        let task = db
            .create_task_sync(&owner, &input("Clean room", "Sarah", "Chores"))
            .unwrap();
        let updated = db
            .update_task_sync(
                &owner,
                task.id,
                &UpdateTask {
                    title: "Clean room and closet".into(),
                    description: Some("before dinner".into()),
                    assignee: "Tommy".into(),
                    priority: Priority::High,
                    category: "Other".into(),
                    completed: true,
                },
            )
            .unwrap();
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.title, "Clean room and closet");
        assert_eq!(updated.description.as_deref(), Some("before dinner"));
        assert_eq!(updated.assignee, "Tommy");
        assert_eq!(updated.priority, Priority::High);
        assert!(updated.completed);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[test]
    fn update_missing_task_is_not_found() {
        let (db, owner) = setup();
        let err = db
            .update_task_sync(
                &owner,
                404,
                &UpdateTask {
                    title: "x".into(),
                    description: None,
                    assignee: "Mom".into(),
                    priority: Priority::Low,
                    category: String::new(),
                    completed: false,
                },
            )
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn double_toggle_restores_state() {
        let (db, owner) = setup();
        let task = db
            .create_task_sync(&owner, &input("Dishes", "Dad", "Chores"))
            .unwrap();
        let done = db.set_task_completed_sync(&owner, task.id, true).unwrap();
        assert!(done.completed);
        let open = db.set_task_completed_sync(&owner, task.id, false).unwrap();
        assert!(!open.completed);
        assert_eq!(open.title, task.title);
    }
}
