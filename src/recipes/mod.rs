mod dto;
pub mod handlers;
pub mod nutrition;
pub mod repo;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipe",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        .route(
            "/recipe/:id",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
}
