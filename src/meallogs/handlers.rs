use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    meallogs::{
        dto::{
            CreateMealLogRequest, DailySummaryDto, MealLogDto, MealLogListQuery, MealType,
            MealTypeSummaryDto, SummaryQuery, UpdateMealLogRequest,
        },
        format_date, parse_date, repo,
        summary::summarize,
    },
    pagination::{Page, PageParams},
    state::AppState,
};

async fn populated(state: &AppState, log: repo::MealLogRow) -> Result<MealLogDto, ApiError> {
    let recipes = repo::recipes_for(&state.db, &[log.id]).await?;
    Ok(MealLogDto::from_parts(log, recipes))
}

fn owner_guard(log: &repo::MealLogRow, user: &AuthUser, action: &str) -> Result<(), ApiError> {
    if log.user_id != user.id {
        warn!(meal_log_id = %log.id, user_id = %user.id, "unauthorized meal log access");
        return Err(ApiError::Authorization(format!(
            "Unauthorized to {action} this meal log"
        )));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_meal_log(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMealLogRequest>,
) -> Result<(StatusCode, Json<MealLogDto>), ApiError> {
    let resolved = repo::resolve_recipes(&state.db, &payload.recipe_ids).await?;
    if resolved.is_empty() {
        return Err(ApiError::Validation("No valid recipes found.".into()));
    }

    // totalCalories is a snapshot of the referenced recipes at creation time;
    // later recipe edits do not flow back into it.
    let total_calories: f64 = resolved.iter().map(|r| r.calories_per_serving).sum();
    let ids: Vec<Uuid> = resolved.iter().map(|r| r.id).collect();
    let today = OffsetDateTime::now_utc().date();

    let log = repo::create(
        &state.db,
        user.id,
        today,
        payload.meal_type.as_str(),
        total_calories,
        &ids,
    )
    .await?;
    info!(meal_log_id = %log.id, user_id = %user.id, "meal log created");
    Ok((StatusCode::CREATED, Json(populated(&state, log).await?)))
}

#[instrument(skip(state))]
pub async fn list_meal_logs(
    State(state): State<AppState>,
    user: AuthUser,
    params: PageParams,
    Query(q): Query<MealLogListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Page<MealLogDto>, ApiError> {
    let meal_type = q.meal_type.map(|m| m.as_str());
    let logs = repo::list(&state.db, user.id, meal_type, params.limit, params.offset()).await?;
    let total = repo::count(&state.db, user.id, meal_type).await?;

    let ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
    let mut recipes = repo::group_recipes(repo::recipes_for(&state.db, &ids).await?);
    let items = logs
        .into_iter()
        .map(|log| {
            let log_recipes = recipes.remove(&log.id).unwrap_or_default();
            MealLogDto::from_parts(log, log_recipes)
        })
        .collect();
    Ok(Page::new(&uri, params, total, items))
}

/// Per-meal-type rollups for one calendar day, recomputed from the stored
/// per-recipe per-serving macros.
#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<DailySummaryDto>, ApiError> {
    let date: Date = match &q.date {
        Some(s) => parse_date(s)?,
        None => OffsetDateTime::now_utc().date(),
    };

    let logs = repo::for_date(&state.db, user.id, date).await?;
    let ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
    let by_log = repo::group_recipes(repo::recipes_for(&state.db, &ids).await?);

    let meal_types = MealType::ALL
        .iter()
        .map(|mt| {
            let per_serving = logs
                .iter()
                .filter(|log| log.meal_type == mt.as_str())
                .flat_map(|log| by_log.get(&log.id).into_iter().flatten())
                .map(|r| r.per_serving());
            MealTypeSummaryDto {
                meal_type: mt.as_str(),
                totals: summarize(per_serving),
            }
        })
        .collect();

    Ok(Json(DailySummaryDto {
        date: format_date(date),
        meal_types,
    }))
}

#[instrument(skip(state))]
pub async fn get_meal_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealLogDto>, ApiError> {
    let log = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("MealLog not found".into()))?;
    owner_guard(&log, &user, "view")?;
    Ok(Json(populated(&state, log).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_meal_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealLogRequest>,
) -> Result<Json<MealLogDto>, ApiError> {
    let log = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("MealLog not found".into()))?;
    owner_guard(&log, &user, "update")?;

    let meal_type = payload
        .meal_type
        .map(|m| m.as_str().to_string())
        .unwrap_or(log.meal_type);

    // Changing the recipe set restamps the calorie total; there is no path
    // that sets the total directly.
    let (total_calories, ids) = match payload.recipe_ids {
        Some(recipe_ids) => {
            let resolved = repo::resolve_recipes(&state.db, &recipe_ids).await?;
            if resolved.is_empty() {
                return Err(ApiError::Validation("No valid recipes found.".into()));
            }
            let total = resolved.iter().map(|r| r.calories_per_serving).sum();
            (total, resolved.iter().map(|r| r.id).collect::<Vec<_>>())
        }
        None => {
            let existing = repo::recipes_for(&state.db, &[log.id]).await?;
            (
                log.total_calories,
                existing.iter().map(|r| r.recipe_id).collect(),
            )
        }
    };

    let updated = repo::replace(&state.db, id, &meal_type, total_calories, &ids).await?;
    info!(meal_log_id = %id, "meal log updated");
    Ok(Json(populated(&state, updated).await?))
}

#[instrument(skip(state))]
pub async fn delete_meal_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let log = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("MealLog not found".into()))?;
    owner_guard(&log, &user, "delete")?;
    repo::delete(&state.db, id).await?;
    info!(meal_log_id = %id, "meal log deleted");
    Ok(Json(
        serde_json::json!({ "message": "MealLog deleted successfully" }),
    ))
}
