use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ingredients::dto::{CreateIngredientRequest, UpdateIngredientRequest};
use crate::pagination::SortDir;

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub quantity_in_stock: f64,
    pub unit: Option<String>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub fat_per_100g: f64,
    pub carbs_per_100g: f64,
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, quantity_in_stock, unit, calories_per_100g, \
     protein_per_100g, fat_per_100g, carbs_per_100g, created_at";

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Ingredient>> {
    sqlx::query_as::<_, Ingredient>(&format!(
        "SELECT {COLUMNS} FROM ingredients WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(
    db: &PgPool,
    search: &str,
    sort_col: &str,
    dir: SortDir,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Ingredient>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM ingredients WHERE name ILIKE $1 \
         ORDER BY {sort_col} {} LIMIT $2 OFFSET $3",
        dir.as_sql()
    );
    sqlx::query_as::<_, Ingredient>(&sql)
        .bind(format!("%{search}%"))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count(db: &PgPool, search: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ingredients WHERE name ILIKE $1")
        .bind(format!("%{search}%"))
        .fetch_one(db)
        .await
}

pub async fn create(db: &PgPool, req: &CreateIngredientRequest) -> sqlx::Result<Ingredient> {
    sqlx::query_as::<_, Ingredient>(&format!(
        "INSERT INTO ingredients \
             (name, quantity_in_stock, unit, calories_per_100g, protein_per_100g, \
              fat_per_100g, carbs_per_100g) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {COLUMNS}"
    ))
    .bind(&req.name)
    .bind(req.quantity_in_stock)
    .bind(req.unit.as_deref())
    .bind(req.calories_per_100g)
    .bind(req.protein_per_100g)
    .bind(req.fat_per_100g)
    .bind(req.carbs_per_100g)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    req: &UpdateIngredientRequest,
) -> sqlx::Result<Option<Ingredient>> {
    sqlx::query_as::<_, Ingredient>(&format!(
        "UPDATE ingredients SET \
             name = COALESCE($2, name), \
             quantity_in_stock = COALESCE($3, quantity_in_stock), \
             unit = COALESCE($4, unit), \
             calories_per_100g = COALESCE($5, calories_per_100g), \
             protein_per_100g = COALESCE($6, protein_per_100g), \
             fat_per_100g = COALESCE($7, fat_per_100g), \
             carbs_per_100g = COALESCE($8, carbs_per_100g) \
         WHERE id = $1 \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(req.name.as_deref())
    .bind(req.quantity_in_stock)
    .bind(req.unit.as_deref())
    .bind(req.calories_per_100g)
    .bind(req.protein_per_100g)
    .bind(req.fat_per_100g)
    .bind(req.carbs_per_100g)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
