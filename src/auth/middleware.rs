use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// Bearer-token gate. A no-op when no JWT secret is configured; otherwise
/// the verified `Claims` are stored in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(keys) = state.jwt.as_deref() else {
        return Ok(next.run(req).await);
    };

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("authorization header is missing".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| ApiError::Unauthorized("authorization header is missing".into()))?;

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        ApiError::Unauthorized("invalid or expired token".into())
    })?;

    debug!(user_id = claims.user_id, "request authenticated");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
