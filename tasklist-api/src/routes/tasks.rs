/// Task endpoints
///
/// All routes sit behind the bearer token gate; handlers receive the
/// caller's identity through [`AuthContext`] and pass it to [`TaskService`].
///
/// # Endpoints
///
/// - `GET    /tasks` - List own tasks
/// - `POST   /tasks` - Create a task (201)
/// - `PUT    /tasks/:id` - Update status (owner only)
/// - `DELETE /tasks/:id` - Delete (owner only, 204)
/// - `GET    /tasks/status/:status` - Filter own tasks by status

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tasklist_shared::{
    auth::middleware::AuthContext,
    models::task::Task,
    services::{CreateTaskInput, TaskService, UpdateStatusInput},
};
use uuid::Uuid;

/// Task IDs that do not parse name no task, so they are 404 like unknown ones
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = TaskService::new(state.store.as_ref()).list(auth.user_id).await?;

    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppJson(input): AppJson<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = TaskService::new(state.store.as_ref())
        .create(auth.user_id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update status handler
///
/// # Example
///
/// ```text
/// PUT /tasks/0b6c...
/// { "status": "completed" }
/// ```
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateStatusInput>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;
    let task = TaskService::new(state.store.as_ref())
        .update_status(auth.user_id, id, input)
        .await?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&id)?;
    TaskService::new(state.store.as_ref())
        .delete(auth.user_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn filter_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(status): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = TaskService::new(state.store.as_ref())
        .filter_by_status(auth.user_id, &status)
        .await?;

    Ok(Json(tasks))
}
