mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/mealbox",
            get(handlers::list_meal_boxes).post(handlers::create_meal_box),
        )
        .route(
            "/mealbox/:id",
            get(handlers::get_meal_box)
                .put(handlers::update_meal_box)
                .delete(handlers::delete_meal_box),
        )
        .route("/mealbox/order/:id", patch(handlers::order_meal_box))
        .route("/mealbox/request/:id", patch(handlers::request_restock))
}
