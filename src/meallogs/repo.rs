use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::meallogs::summary::MacroSummary;

#[derive(Debug, Clone, FromRow)]
pub struct MealLogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: Date,
    pub meal_type: String,
    pub total_calories: f64,
    pub created_at: OffsetDateTime,
}

/// A log's recipe reference joined with the live recipe row. Dangling
/// references never appear here because the join is inner.
#[derive(Debug, Clone, FromRow)]
pub struct LogRecipeRow {
    pub meal_log_id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub calories_per_serving: f64,
    pub protein_per_serving: f64,
    pub fat_per_serving: f64,
    pub carbs_per_serving: f64,
}

impl LogRecipeRow {
    pub fn per_serving(&self) -> MacroSummary {
        MacroSummary {
            calories: self.calories_per_serving,
            protein: self.protein_per_serving,
            fat: self.fat_per_serving,
            carbs: self.carbs_per_serving,
        }
    }
}

const COLUMNS: &str = "id, user_id, log_date, meal_type, total_calories, created_at";

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<MealLogRow>> {
    sqlx::query_as::<_, MealLogRow>(&format!(
        "SELECT {COLUMNS} FROM meal_logs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    meal_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<MealLogRow>> {
    sqlx::query_as::<_, MealLogRow>(&format!(
        "SELECT {COLUMNS} FROM meal_logs \
         WHERE user_id = $1 AND ($2::text IS NULL OR meal_type = $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4"
    ))
    .bind(user_id)
    .bind(meal_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count(db: &PgPool, user_id: Uuid, meal_type: Option<&str>) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM meal_logs \
         WHERE user_id = $1 AND ($2::text IS NULL OR meal_type = $2)",
    )
    .bind(user_id)
    .bind(meal_type)
    .fetch_one(db)
    .await
}

pub async fn for_date(db: &PgPool, user_id: Uuid, date: Date) -> sqlx::Result<Vec<MealLogRow>> {
    sqlx::query_as::<_, MealLogRow>(&format!(
        "SELECT {COLUMNS} FROM meal_logs \
         WHERE user_id = $1 AND log_date = $2 ORDER BY created_at"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(db)
    .await
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    meal_type: &str,
    total_calories: f64,
    recipe_ids: &[Uuid],
) -> sqlx::Result<MealLogRow> {
    let mut tx = db.begin().await?;
    let log = sqlx::query_as::<_, MealLogRow>(&format!(
        "INSERT INTO meal_logs (user_id, log_date, meal_type, total_calories) \
         VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(date)
    .bind(meal_type)
    .bind(total_calories)
    .fetch_one(&mut *tx)
    .await?;

    insert_links(&mut tx, log.id, recipe_ids).await?;
    tx.commit().await?;
    Ok(log)
}

pub async fn replace(
    db: &PgPool,
    id: Uuid,
    meal_type: &str,
    total_calories: f64,
    recipe_ids: &[Uuid],
) -> sqlx::Result<MealLogRow> {
    let mut tx = db.begin().await?;
    let log = sqlx::query_as::<_, MealLogRow>(&format!(
        "UPDATE meal_logs SET meal_type = $2, total_calories = $3 \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(meal_type)
    .bind(total_calories)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM meal_log_recipes WHERE meal_log_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_links(&mut tx, id, recipe_ids).await?;
    tx.commit().await?;
    Ok(log)
}

async fn insert_links(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    meal_log_id: Uuid,
    recipe_ids: &[Uuid],
) -> sqlx::Result<()> {
    for (position, recipe_id) in recipe_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO meal_log_recipes (meal_log_id, recipe_id, position) \
             VALUES ($1, $2, $3)",
        )
        .bind(meal_log_id)
        .bind(recipe_id)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM meal_logs WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Per-serving macros of the surviving recipes for a set of logs.
pub async fn recipes_for(db: &PgPool, log_ids: &[Uuid]) -> sqlx::Result<Vec<LogRecipeRow>> {
    sqlx::query_as::<_, LogRecipeRow>(
        "SELECT mlr.meal_log_id, r.id AS recipe_id, r.name, r.calories_per_serving, \
                r.protein_per_serving, r.fat_per_serving, r.carbs_per_serving \
         FROM meal_log_recipes mlr \
         JOIN recipes r ON r.id = mlr.recipe_id \
         WHERE mlr.meal_log_id = ANY($1) \
         ORDER BY mlr.meal_log_id, mlr.position",
    )
    .bind(log_ids)
    .fetch_all(db)
    .await
}

/// The subset of referenced recipes that still exist, with the per-serving
/// calories used to stamp a log's total. Missing ids are simply absent.
#[derive(Debug, Clone, FromRow)]
pub struct ResolvedRecipe {
    pub id: Uuid,
    pub calories_per_serving: f64,
}

pub async fn resolve_recipes(
    db: &PgPool,
    recipe_ids: &[Uuid],
) -> sqlx::Result<Vec<ResolvedRecipe>> {
    sqlx::query_as::<_, ResolvedRecipe>(
        "SELECT id, calories_per_serving FROM recipes WHERE id = ANY($1)",
    )
    .bind(recipe_ids)
    .fetch_all(db)
    .await
}

pub fn group_recipes(rows: Vec<LogRecipeRow>) -> HashMap<Uuid, Vec<LogRecipeRow>> {
    let mut by_log: HashMap<Uuid, Vec<LogRecipeRow>> = HashMap::new();
    for row in rows {
        by_log.entry(row.meal_log_id).or_default().push(row);
    }
    by_log
}
