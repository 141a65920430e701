use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    error::{path_id, ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    storage::StorageError,
};

use super::dto::TaskRequest;

fn content_of(payload: Result<Json<TaskRequest>, JsonRejection>) -> ApiResult<String> {
    let Json(req) = payload?;
    if req.task_content.trim().is_empty() {
        warn!("empty task content");
        return Err(ApiError::BadRequest("task content is required".into()));
    }
    Ok(req.task_content)
}

/// `POST /task/:id` where the id names the owning user.
#[instrument(skip_all)]
pub async fn save_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let user_id = path_id(path)?;
    let content = content_of(payload)?;

    let task_id = match state.storage.save_task(user_id, &content).await {
        Ok(id) => id,
        Err(StorageError::ForeignKeyViolation) => {
            warn!(user_id, "task for unknown user");
            return Err(ApiError::Conflict(StorageError::UserNotFound.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id, task_id, "task saved");
    Ok(ApiResponse::created(json!({ "userId": user_id, "taskId": task_id })))
}

#[instrument(skip_all)]
pub async fn get_tasks_by_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse> {
    let user_id = path_id(path)?;
    let tasks = state.storage.get_tasks_by_user_id(user_id).await?;
    if tasks.is_empty() {
        warn!(user_id, "no tasks found for user");
        return Err(StorageError::TaskNotFound.into());
    }
    info!(user_id, count = tasks.len(), "tasks fetched");
    Ok(ApiResponse::ok(json!({ "tasks": tasks })))
}

#[instrument(skip_all)]
pub async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse> {
    let task_id = path_id(path)?;
    let task = state.storage.get_task_by_id(task_id).await?;
    info!(task_id, user_id = task.user_id, "task fetched");
    Ok(ApiResponse::ok(json!({ "task": task })))
}

#[instrument(skip_all)]
pub async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let task_id = path_id(path)?;
    let content = content_of(payload)?;
    state.storage.update_task_content(task_id, &content).await?;
    info!(task_id, "task updated");
    Ok(ApiResponse::ok(json!({ "taskId": task_id })))
}

#[instrument(skip_all)]
pub async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse> {
    let task_id = path_id(path)?;
    state.storage.delete_task(task_id).await?;
    info!(task_id, "task deleted");
    Ok(ApiResponse::ok_empty())
}
