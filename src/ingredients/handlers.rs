use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    error::ApiError,
    ingredients::{
        dto::{CreateIngredientRequest, IngredientDto, UpdateIngredientRequest},
        repo,
    },
    pagination::{ListQuery, Page, PageParams},
    state::AppState,
};

const SORTABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("unit", "unit"),
    ("quantityInStock", "quantity_in_stock"),
    ("caloriesPer100g", "calories_per_100g"),
    ("proteinPer100g", "protein_per_100g"),
    ("fatPer100g", "fat_per_100g"),
    ("carbsPer100g", "carbs_per_100g"),
    ("createdAt", "created_at"),
];

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    params: PageParams,
    Query(q): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Page<IngredientDto>, ApiError> {
    let sort_col = q.sort_column(SORTABLE, "name");
    let rows = repo::list(
        &state.db,
        &q.search,
        sort_col,
        q.dir(),
        params.limit,
        params.offset(),
    )
    .await?;
    let total = repo::count(&state.db, &q.search).await?;
    let items = rows.into_iter().map(IngredientDto::from).collect();
    Ok(Page::new(&uri, params, total, items))
}

#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IngredientDto>, ApiError> {
    let ingredient = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".into()))?;
    Ok(Json(ingredient.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientDto>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let created = repo::create(&state.db, &payload).await?;
    info!(ingredient_id = %created.id, name = %created.name, "ingredient created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIngredientRequest>,
) -> Result<Json<IngredientDto>, ApiError> {
    // Recipes computed before this update keep their stored snapshots; nutrient
    // edits only affect future aggregations.
    let updated = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".into()))?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Ingredient not found".into()));
    }
    info!(ingredient_id = %id, "ingredient deleted");
    Ok(Json(
        serde_json::json!({ "message": "Ingredient deleted successfully" }),
    ))
}
