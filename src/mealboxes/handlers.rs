use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, AuthUser},
    error::ApiError,
    mealboxes::{
        dto::{
            CreateMealBoxRequest, MealBoxDto, OrderRequest, StockChangeResponse,
            UpdateMealBoxRequest,
        },
        repo,
    },
    pagination::{ListQuery, Page, PageParams},
    state::AppState,
};

const SORTABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("calories", "calories"),
    ("price", "price"),
    ("stockAvailable", "stock_available"),
    ("createdAt", "created_at"),
];

#[instrument(skip(state))]
pub async fn list_meal_boxes(
    State(state): State<AppState>,
    params: PageParams,
    Query(q): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Page<MealBoxDto>, ApiError> {
    let sort_col = q.sort_column(SORTABLE, "name");
    let boxes = repo::list(
        &state.db,
        &q.search,
        sort_col,
        q.dir(),
        params.limit,
        params.offset(),
    )
    .await?;
    let total = repo::count(&state.db, &q.search).await?;
    let items = boxes.into_iter().map(MealBoxDto::from).collect();
    Ok(Page::new(&uri, params, total, items))
}

#[instrument(skip(state))]
pub async fn get_meal_box(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MealBoxDto>, ApiError> {
    let meal_box = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("MealBox not found".into()))?;
    Ok(Json(meal_box.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_meal_box(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateMealBoxRequest>,
) -> Result<(StatusCode, Json<MealBoxDto>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    if payload.stock_available < 0 {
        return Err(ApiError::Validation(
            "stockAvailable must not be negative".into(),
        ));
    }
    let created = repo::create(&state.db, &payload).await?;
    info!(meal_box_id = %created.id, name = %created.name, "meal box created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_meal_box(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealBoxRequest>,
) -> Result<Json<MealBoxDto>, ApiError> {
    if payload.stock_available.is_some_and(|s| s < 0) {
        return Err(ApiError::Validation(
            "stockAvailable must not be negative".into(),
        ));
    }
    let updated = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("MealBox not found".into()))?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
pub async fn delete_meal_box(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("MealBox not found".into()));
    }
    info!(meal_box_id = %id, "meal box deleted");
    Ok(Json(
        serde_json::json!({ "message": "MealBox deleted successfully" }),
    ))
}

#[instrument(skip(state))]
pub async fn order_meal_box(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderRequest>,
) -> Result<Json<StockChangeResponse>, ApiError> {
    if payload.quantity < 1 {
        return Err(ApiError::Validation(
            "quantity must be a positive integer".into(),
        ));
    }

    match repo::order(&state.db, id, payload.quantity).await? {
        Some(updated) => {
            info!(meal_box_id = %id, user_id = %user.id, quantity = payload.quantity, "order placed");
            Ok(Json(StockChangeResponse {
                message: "Order placed successfully",
                updated_meal_box: updated.into(),
            }))
        }
        // The guard rejected: distinguish a missing box from thin stock
        None => match repo::find_by_id(&state.db, id).await? {
            Some(existing) => {
                warn!(
                    meal_box_id = %id,
                    requested = payload.quantity,
                    available = existing.stock_available,
                    "insufficient stock"
                );
                Err(ApiError::Conflict("Not enough stock available".into()))
            }
            None => Err(ApiError::NotFound("MealBox not found".into())),
        },
    }
}

#[instrument(skip(state))]
pub async fn request_restock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StockChangeResponse>, ApiError> {
    let updated = repo::restock(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("MealBox not found".into()))?;
    info!(meal_box_id = %id, user_id = %user.id, "restock requested");
    Ok(Json(StockChangeResponse {
        message: "Restock request successful",
        updated_meal_box: updated.into(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::PgPool;

    use super::*;
    use crate::config::AppConfig;

    fn test_state(pool: PgPool) -> AppState {
        AppState::from_parts(pool, Arc::new(AppConfig::for_tests()))
    }

    fn some_user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            is_admin: false,
        }
    }

    async fn seed_box(db: &PgPool, stock: i32) -> repo::MealBox {
        repo::create(
            db,
            &CreateMealBoxRequest {
                name: "Tofu Box".into(),
                description: None,
                calories: 400.0,
                price: None,
                stock_available: stock,
            },
        )
        .await
        .expect("seed meal box")
    }

    #[sqlx::test]
    async fn ordering_a_missing_box_is_not_found(pool: PgPool) {
        let err = order_meal_box(
            State(test_state(pool)),
            some_user(),
            Path(Uuid::new_v4()),
            Json(OrderRequest { quantity: 1 }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[sqlx::test]
    async fn ordering_beyond_stock_is_a_conflict(pool: PgPool) {
        let state = test_state(pool);
        let b = seed_box(&state.db, 3).await;

        let err = order_meal_box(
            State(state.clone()),
            some_user(),
            Path(b.id),
            Json(OrderRequest { quantity: 5 }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let after = repo::find_by_id(&state.db, b.id).await.unwrap().unwrap();
        assert_eq!(after.stock_available, 3);
    }

    #[sqlx::test]
    async fn successful_order_reports_the_updated_stock(pool: PgPool) {
        let state = test_state(pool);
        let b = seed_box(&state.db, 3).await;

        let Json(res) = order_meal_box(
            State(state),
            some_user(),
            Path(b.id),
            Json(OrderRequest { quantity: 2 }),
        )
        .await
        .unwrap();
        assert_eq!(res.message, "Order placed successfully");
        assert_eq!(res.updated_meal_box.stock_available, 1);
    }

    #[sqlx::test]
    async fn non_positive_quantity_is_a_validation_error(pool: PgPool) {
        let state = test_state(pool);
        let b = seed_box(&state.db, 3).await;

        let err = order_meal_box(
            State(state),
            some_user(),
            Path(b.id),
            Json(OrderRequest { quantity: 0 }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
