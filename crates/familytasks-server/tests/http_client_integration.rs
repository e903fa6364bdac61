//! Integration tests for HttpService and the task store against a real server.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 with in-memory
//! SQLite, then drives the HTTP client layer through full request/response
//! cycles.

use std::sync::Arc;

use familytasks_core::notification::NotificationLog;
use familytasks_core::task::{CreateTask, Priority, TaskDraft, UpdateTask};
use familytasks_server::test_helpers::{issue_key, spawn_test_server, spawn_test_server_with_auth};
use familytasks_service::{
    BlockingHttpService, HttpService, ServiceError, StoreError, TaskService, TaskStore,
};

fn create(title: &str, assignee: &str, category: &str) -> CreateTask {
    CreateTask {
        title: title.into(),
        description: None,
        assignee: assignee.into(),
        priority: Priority::Medium,
        category: category.into(),
    }
}

fn draft(title: &str, assignee: &str, category: &str) -> TaskDraft {
    TaskDraft {
        id: None,
        title: title.into(),
        description: None,
        assignee: assignee.into(),
        priority: Priority::Medium,
        category: category.into(),
        completed: false,
    }
}

#[tokio::test]
async fn health_check_via_http() {
    let server = spawn_test_server().await;
    HttpService::new(&server.base_url).health_check().await.unwrap();
}

#[tokio::test]
async fn open_server_session_is_local_user() {
    let server = spawn_test_server().await;
    let me = HttpService::new(&server.base_url).session().await.unwrap();
    assert_eq!(me.name, familytasks_server::OPEN_ACCESS_USER);
}

#[tokio::test]
async fn task_crud_via_http() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);

    let task = svc
        .create_task(&create("Math worksheet", "Tommy", "Homework"))
        .await
        .unwrap();
    assert_eq!(task.title, "Math worksheet");
    assert!(!task.completed);

    let fetched = svc.get_task(task.id).await.unwrap();
    assert_eq!(fetched.id, task.id);

    let updated = svc
        .update_task(
            task.id,
            &UpdateTask {
                title: "Math worksheet p.12".into(),
                description: Some("both sides".into()),
                assignee: "Tommy".into(),
                priority: Priority::High,
                category: "Homework".into(),
                completed: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.priority, Priority::High);

    let done = svc.set_completed(task.id, true).await.unwrap();
    assert!(done.completed);

    let all = svc.list_tasks().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Math worksheet p.12");
}

#[tokio::test]
async fn list_is_newest_first_via_http() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    for title in ["one", "two", "three"] {
        svc.create_task(&create(title, "Mom", "Other")).await.unwrap();
    }
    let titles: Vec<String> = svc
        .list_tasks()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["three", "two", "one"]);
}

#[tokio::test]
async fn errors_map_to_service_errors() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);

    let err = svc.get_task(12345).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = svc.create_task(&create("   ", "Mom", "")).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn missing_key_is_unauthorized() {
    let server = spawn_test_server_with_auth().await;
    let svc = HttpService::new(&server.base_url);
    let err = svc.session().await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));
    // health stays public
    svc.health_check().await.unwrap();
}

#[tokio::test]
async fn tasks_are_scoped_per_key_owner() {
    let server = spawn_test_server_with_auth().await;
    let mom_key = issue_key(&server.db, "Mom").await;
    let dad_key = issue_key(&server.db, "Dad").await;
    let mom = HttpService::with_api_key(&server.base_url, mom_key);
    let dad = HttpService::with_api_key(&server.base_url, dad_key);

    assert_eq!(mom.session().await.unwrap().name, "Mom");

    let task = mom
        .create_task(&create("Groceries", "Mom", "Other"))
        .await
        .unwrap();
    assert!(dad.list_tasks().await.unwrap().is_empty());
    assert!(matches!(
        dad.set_completed(task.id, true).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert!(!mom.get_task(task.id).await.unwrap().completed);
}

#[tokio::test]
async fn store_toggle_scenario_over_http() {
    let server = spawn_test_server().await;
    let log = Arc::new(NotificationLog::new());
    let mut store = TaskStore::new(Arc::new(HttpService::new(&server.base_url)), log.clone());

    let task = store
        .save(&draft("Clean room", "Sarah", "Chores"))
        .await
        .unwrap();
    assert_eq!(
        log.drain()[0].description,
        "\"Clean room\" has been assigned to Sarah"
    );

    store.toggle_completion(task.id).await.unwrap();
    assert!(store.tasks()[0].completed);
    assert_eq!(log.last().unwrap().title, "Task completed! 🎉");

    store.toggle_completion(task.id).await.unwrap();
    assert!(!store.tasks()[0].completed);
    let notes = log.drain();
    assert_eq!(notes.last().unwrap().title, "Task reopened");
    assert_eq!(notes.last().unwrap().description, "Clean room");
}

#[tokio::test]
async fn store_fetch_failure_over_http() {
    let server = spawn_test_server_with_auth().await;
    let log = Arc::new(NotificationLog::new());
    let mut store = TaskStore::new(Arc::new(HttpService::new(&server.base_url)), log.clone());

    let err = store.list().await.unwrap_err();
    assert!(matches!(err, StoreError::Fetch(ServiceError::Unauthorized(_))));
    assert_eq!(log.last().unwrap().title, "Error fetching tasks");
}

#[test]
fn blocking_http_service_probe() {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let server = spawn_test_server().await;
            tx.send(server.base_url.clone()).unwrap();
            std::future::pending::<()>().await;
        });
    });
    let url = rx.recv().unwrap();

    let svc = BlockingHttpService::new(&url).unwrap();
    svc.health_check().unwrap();
    assert_eq!(
        svc.session().unwrap().name,
        familytasks_server::OPEN_ACCESS_USER
    );
}
