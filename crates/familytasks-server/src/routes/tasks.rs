use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use familytasks_core::identity::Identity;
use familytasks_core::task::{CreateTask, SetCompleted, TaskId, UpdateTask};
use familytasks_service::TaskService;
use serde_json::{json, Value};

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", get(get_task).put(update_task))
        .route("/api/tasks/{id}/completed", put(set_completed))
}

async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(identity)
        .list_tasks()
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(identity)
        .get_task(id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let task = state
        .service_for(identity)
        .create_task(&input)
        .await
        .map_err(to_error)?;
    tracing::info!(task_id = task.id, assignee = %task.assignee, "task created");
    Ok((StatusCode::CREATED, Json(json!(task))))
}

async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<TaskId>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(identity)
        .update_task(id, &input)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn set_completed(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<TaskId>,
    Json(input): Json<SetCompleted>,
) -> Result<Json<Value>, ApiError> {
    state
        .service_for(identity)
        .set_completed(id, input.completed)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_helpers::{body_json, json_body, test_router};

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(json_body(body))
            .unwrap()
    }

    fn put(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(json_body(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn create_returns_201_with_defaults() {
        let app = test_router().await;
        let resp = app
            .oneshot(post(
                "/api/tasks",
                json!({ "title": "Walk the dog", "assignee": "Tommy" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let task = body_json(resp).await;
        assert_eq!(task["priority"], "Medium");
        assert_eq!(task["completed"], false);
        assert!(task["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn blank_title_is_bad_request() {
        let app = test_router().await;
        let resp = app
            .oneshot(post("/api/tasks", json!({ "title": " ", "assignee": "Mom" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn blank_assignee_is_bad_request() {
        let app = test_router().await;
        let resp = app
            .clone()
            .oneshot(post("/api/tasks", json!({ "title": "Dishes", "assignee": "" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let created = body_json(
            app.clone()
                .oneshot(post("/api/tasks", json!({ "title": "Dishes", "assignee": "Dad" })))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_i64().unwrap();
        let resp = app
            .clone()
            .oneshot(put(
                &format!("/api/tasks/{id}"),
                json!({ "title": "Dishes", "assignee": "  ", "priority": "Low", "completed": false }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let list = body_json(app.oneshot(get("/api/tasks")).await.unwrap()).await;
        assert_eq!(list[0]["assignee"], "Dad");
    }

    #[tokio::test]
    async fn unknown_priority_is_rejected() {
        let app = test_router().await;
        let resp = app
            .oneshot(post(
                "/api/tasks",
                json!({ "title": "x", "assignee": "Mom", "priority": "Urgent" }),
            ))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn missing_task_is_404() {
        let app = test_router().await;
        let resp = app.oneshot(get("/api/tasks/9999")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_and_complete_flow() {
        let app = test_router().await;
        let created = body_json(
            app.clone()
                .oneshot(post(
                    "/api/tasks",
                    json!({ "title": "Clean room", "assignee": "Sarah", "category": "Chores" }),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let resp = app
            .clone()
            .oneshot(put(
                &format!("/api/tasks/{id}/completed"),
                json!({ "completed": true }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["completed"], true);

        let resp = app
            .clone()
            .oneshot(put(
                &format!("/api/tasks/{id}"),
                json!({
                    "title": "Clean room",
                    "description": "and make the bed",
                    "assignee": "Sarah",
                    "priority": "High",
                    "category": "Chores",
                    "completed": true
                }),
            ))
            .await
            .unwrap();
        let updated = body_json(resp).await;
        assert_eq!(updated["priority"], "High");
        assert_eq!(updated["completed"], true);

        let list = body_json(app.oneshot(get("/api/tasks")).await.unwrap()).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }
}
