mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users/current", get(handlers::current_user))
        .route("/users", get(handlers::list_users))
        .route(
            "/users/:id",
            put(handlers::update_user).delete(handlers::delete_user),
        )
}
