use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;

/// Routes reachable without a token: registration and login.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/user/", post(handlers::save_user))
        .route("/user/login", post(handlers::login))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/user/:id",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/user/:id/password", put(handlers::update_password))
}
