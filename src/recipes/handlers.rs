use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    ingredients,
    pagination::{ListQuery, Page, PageParams},
    recipes::{
        dto::{CreateRecipeRequest, RecipeDto, RecipeLineRequest},
        nutrition::{compute_nutrition, NutrientFacts, NutritionSnapshot},
        repo,
    },
    state::AppState,
};

/// Resolves every referenced ingredient and recomputes the snapshot. Any
/// missing ingredient aborts the whole operation.
async fn resolve_and_compute(
    state: &AppState,
    lines: &[RecipeLineRequest],
    servings: i32,
) -> Result<NutritionSnapshot, ApiError> {
    let mut resolved = Vec::with_capacity(lines.len());
    for line in lines {
        let ingredient = ingredients::repo::find_by_id(&state.db, line.ingredient_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "Ingredient with ID {} not found.",
                    line.ingredient_id
                ))
            })?;
        resolved.push((
            NutrientFacts {
                calories_per_100g: ingredient.calories_per_100g,
                protein_per_100g: ingredient.protein_per_100g,
                fat_per_100g: ingredient.fat_per_100g,
                carbs_per_100g: ingredient.carbs_per_100g,
            },
            line.quantity,
        ));
    }
    compute_nutrition(&resolved, servings)
}

fn validate_request(req: &CreateRecipeRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() || req.ingredients.is_empty() {
        return Err(ApiError::Validation(
            "All fields are mandatory and ingredients must be a non-empty array.".into(),
        ));
    }
    if req.servings < 1 {
        return Err(ApiError::Validation("servings must be at least 1".into()));
    }
    Ok(())
}

async fn populated(state: &AppState, recipe: repo::Recipe) -> Result<RecipeDto, ApiError> {
    let lines = repo::lines_for(&state.db, &[recipe.id]).await?;
    Ok(RecipeDto::from_parts(recipe, lines))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeDto>), ApiError> {
    validate_request(&payload)?;
    let snapshot = resolve_and_compute(&state, &payload.ingredients, payload.servings).await?;
    let lines: Vec<(Uuid, f64)> = payload
        .ingredients
        .iter()
        .map(|l| (l.ingredient_id, l.quantity))
        .collect();
    let recipe = repo::create(
        &state.db,
        payload.name.trim(),
        payload.servings,
        user.id,
        &snapshot,
        &lines,
    )
    .await?;
    info!(recipe_id = %recipe.id, user_id = %user.id, "recipe created");
    Ok((StatusCode::CREATED, Json(populated(&state, recipe).await?)))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    user: AuthUser,
    params: PageParams,
    Query(q): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Page<RecipeDto>, ApiError> {
    let recipes = repo::list_scoped(
        &state.db,
        &q.search,
        user.id,
        user.is_admin,
        params.limit,
        params.offset(),
    )
    .await?;
    let total = repo::count_scoped(&state.db, &q.search, user.id, user.is_admin).await?;

    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let mut lines = repo::group_lines(repo::lines_for(&state.db, &ids).await?);
    let items = recipes
        .into_iter()
        .map(|r| {
            let recipe_lines = lines.remove(&r.id).unwrap_or_default();
            RecipeDto::from_parts(r, recipe_lines)
        })
        .collect();
    Ok(Page::new(&uri, params, total, items))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDto>, ApiError> {
    let recipe = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;
    Ok(Json(populated(&state, recipe).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<Json<RecipeDto>, ApiError> {
    let existing = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;
    if !user.is_admin && existing.created_by != user.id {
        warn!(recipe_id = %id, user_id = %user.id, "unauthorized recipe update");
        return Err(ApiError::Authorization(
            "Not authorized to update this recipe".into(),
        ));
    }

    validate_request(&payload)?;
    let snapshot = resolve_and_compute(&state, &payload.ingredients, payload.servings).await?;
    let lines: Vec<(Uuid, f64)> = payload
        .ingredients
        .iter()
        .map(|l| (l.ingredient_id, l.quantity))
        .collect();
    let updated = repo::replace(
        &state.db,
        id,
        payload.name.trim(),
        payload.servings,
        &snapshot,
        &lines,
    )
    .await?;
    info!(recipe_id = %id, "recipe snapshot recomputed");
    Ok(Json(populated(&state, updated).await?))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let existing = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;
    if !user.is_admin && existing.created_by != user.id {
        warn!(recipe_id = %id, user_id = %user.id, "unauthorized recipe delete");
        return Err(ApiError::Authorization(
            "Not authorized to delete this recipe".into(),
        ));
    }

    // Meal logs referencing this recipe keep their stored totals; the
    // reference simply stops resolving.
    repo::delete(&state.db, id).await?;
    info!(recipe_id = %id, "recipe deleted");
    Ok(Json(
        serde_json::json!({ "message": "Recipe deleted successfully" }),
    ))
}
