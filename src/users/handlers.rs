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
    auth::password::{hash_password, is_valid_password, verify_password},
    error::{internal, path_id, ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    storage::StorageError,
};

use super::dto::{LoginRequest, SaveUserRequest, UpdatePasswordRequest};

pub const MIN_USERNAME_LEN: usize = 3;
/// Matches the `users.username` column width.
pub const MAX_USERNAME_LEN: usize = 64;

fn invalid_password() -> ApiError {
    ApiError::BadRequest("invalid password".into())
}

#[instrument(skip_all)]
pub async fn save_user(
    State(state): State<AppState>,
    payload: Result<Json<SaveUserRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(mut req) = payload?;
    req.username = req.username.trim().to_string();

    let len = req.username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        warn!(len, "username length out of range");
        return Err(ApiError::BadRequest("invalid username".into()));
    }
    if !is_valid_password(&req.password) {
        warn!(username = %req.username, "password rejected by policy");
        return Err(invalid_password());
    }
    if state.storage.username_exists(&req.username).await? {
        warn!(username = %req.username, "username already exists");
        return Err(ApiError::Conflict("username already exists".into()));
    }

    let hash = hash_password(&req.password).map_err(internal)?;
    let user_id = state.storage.save_user(&req.username, &hash).await?;

    info!(user_id, username = %req.username, "user saved");
    Ok(ApiResponse::created(json!({ "userId": user_id })))
}

#[instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse> {
    let user_id = path_id(path)?;
    let user = state.storage.get_user_by_id(user_id).await?;
    info!(user_id, "user fetched");
    Ok(ApiResponse::ok(json!({ "user": user })))
}

#[instrument(skip_all)]
pub async fn update_password(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let user_id = path_id(path)?;
    let Json(req) = payload?;

    if !is_valid_password(&req.password) {
        warn!(user_id, "password rejected by policy");
        return Err(invalid_password());
    }

    let hash = hash_password(&req.password).map_err(internal)?;
    state.storage.update_user_password(user_id, &hash).await?;

    info!(user_id, "password updated");
    Ok(ApiResponse::ok(json!({ "userId": user_id })))
}

#[instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse> {
    let user_id = path_id(path)?;
    match state.storage.delete_user(user_id).await {
        Ok(()) => {}
        Err(StorageError::ForeignKeyViolation) => {
            return Err(ApiError::Conflict("user still owns tasks".into()));
        }
        Err(e) => return Err(e.into()),
    }
    info!(user_id, "user deleted");
    Ok(ApiResponse::ok_empty())
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let keys = state
        .jwt
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("authentication is disabled".into()))?;
    let Json(req) = payload?;
    let username = req.username.trim();

    let invalid = || ApiError::Unauthorized("invalid credentials".into());

    let user = match state.storage.get_user_by_username(username).await {
        Ok(u) => u,
        Err(StorageError::UserNotFound) => {
            warn!(%username, "login unknown username");
            return Err(invalid());
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&req.password, &user.password_hash).map_err(internal)? {
        warn!(user_id = user.user_id, "login invalid password");
        return Err(invalid());
    }

    let token = keys.sign(user.user_id).map_err(internal)?;
    info!(user_id = user.user_id, "user logged in");
    Ok(ApiResponse::ok(json!({ "token": token, "userId": user.user_id })))
}
