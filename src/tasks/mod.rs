use axum::{routing::get, Router};

use crate::state::AppState;

mod dto;
pub mod handlers;

// `/task/:id` is shared: POST treats the id as the owning user, the other
// verbs as the task itself.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/task/user/:id", get(handlers::get_tasks_by_user))
        .route(
            "/task/:id",
            get(handlers::get_task)
                .post(handlers::save_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
}
