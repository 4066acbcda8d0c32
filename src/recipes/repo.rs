use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::nutrition::NutritionSnapshot;

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub servings: i32,
    pub created_by: Uuid,
    pub total_calories: f64,
    pub calories_per_serving: f64,
    pub total_protein: f64,
    pub protein_per_serving: f64,
    pub total_fat: f64,
    pub fat_per_serving: f64,
    pub total_carbs: f64,
    pub carbs_per_serving: f64,
    pub created_at: OffsetDateTime,
}

/// One ingredient line with its name resolved on read. `ingredient_name` is
/// `None` when the referenced ingredient no longer exists.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeLine {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity_grams: f64,
    pub ingredient_name: Option<String>,
}

const COLUMNS: &str = "id, name, servings, created_by, total_calories, calories_per_serving, \
     total_protein, protein_per_serving, total_fat, fat_per_serving, \
     total_carbs, carbs_per_serving, created_at";

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Recipe>> {
    sqlx::query_as::<_, Recipe>(&format!("SELECT {COLUMNS} FROM recipes WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Non-admins see their own recipes plus recipes authored by any admin.
pub async fn list_scoped(
    db: &PgPool,
    search: &str,
    caller: Uuid,
    caller_is_admin: bool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Recipe>> {
    sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {COLUMNS} FROM recipes \
         WHERE name ILIKE $1 \
           AND ($2 OR created_by = $3 \
                OR created_by IN (SELECT id FROM users WHERE is_admin)) \
         ORDER BY created_at DESC \
         LIMIT $4 OFFSET $5"
    ))
    .bind(format!("%{search}%"))
    .bind(caller_is_admin)
    .bind(caller)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count_scoped(
    db: &PgPool,
    search: &str,
    caller: Uuid,
    caller_is_admin: bool,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM recipes \
         WHERE name ILIKE $1 \
           AND ($2 OR created_by = $3 \
                OR created_by IN (SELECT id FROM users WHERE is_admin))",
    )
    .bind(format!("%{search}%"))
    .bind(caller_is_admin)
    .bind(caller)
    .fetch_one(db)
    .await
}

/// Inserts the recipe row and its lines in one transaction so a failed line
/// insert leaves no partial record.
pub async fn create(
    db: &PgPool,
    name: &str,
    servings: i32,
    created_by: Uuid,
    snapshot: &NutritionSnapshot,
    lines: &[(Uuid, f64)],
) -> sqlx::Result<Recipe> {
    let mut tx = db.begin().await?;
    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        "INSERT INTO recipes \
             (name, servings, created_by, total_calories, calories_per_serving, \
              total_protein, protein_per_serving, total_fat, fat_per_serving, \
              total_carbs, carbs_per_serving) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(servings)
    .bind(created_by)
    .bind(snapshot.total_calories)
    .bind(snapshot.calories_per_serving)
    .bind(snapshot.total_protein)
    .bind(snapshot.protein_per_serving)
    .bind(snapshot.total_fat)
    .bind(snapshot.fat_per_serving)
    .bind(snapshot.total_carbs)
    .bind(snapshot.carbs_per_serving)
    .fetch_one(&mut *tx)
    .await?;

    insert_lines(&mut tx, recipe.id, lines).await?;
    tx.commit().await?;
    Ok(recipe)
}

/// Replaces the recipe row, its snapshot and all of its lines atomically.
pub async fn replace(
    db: &PgPool,
    id: Uuid,
    name: &str,
    servings: i32,
    snapshot: &NutritionSnapshot,
    lines: &[(Uuid, f64)],
) -> sqlx::Result<Recipe> {
    let mut tx = db.begin().await?;
    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        "UPDATE recipes SET \
             name = $2, servings = $3, \
             total_calories = $4, calories_per_serving = $5, \
             total_protein = $6, protein_per_serving = $7, \
             total_fat = $8, fat_per_serving = $9, \
             total_carbs = $10, carbs_per_serving = $11, \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(servings)
    .bind(snapshot.total_calories)
    .bind(snapshot.calories_per_serving)
    .bind(snapshot.total_protein)
    .bind(snapshot.protein_per_serving)
    .bind(snapshot.total_fat)
    .bind(snapshot.fat_per_serving)
    .bind(snapshot.total_carbs)
    .bind(snapshot.carbs_per_serving)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_lines(&mut tx, id, lines).await?;
    tx.commit().await?;
    Ok(recipe)
}

async fn insert_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    recipe_id: Uuid,
    lines: &[(Uuid, f64)],
) -> sqlx::Result<()> {
    for (position, (ingredient_id, quantity)) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity_grams, position) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(quantity)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn lines_for(db: &PgPool, recipe_ids: &[Uuid]) -> sqlx::Result<Vec<RecipeLine>> {
    sqlx::query_as::<_, RecipeLine>(
        "SELECT ri.recipe_id, ri.ingredient_id, ri.quantity_grams, i.name AS ingredient_name \
         FROM recipe_ingredients ri \
         LEFT JOIN ingredients i ON i.id = ri.ingredient_id \
         WHERE ri.recipe_id = ANY($1) \
         ORDER BY ri.recipe_id, ri.position",
    )
    .bind(recipe_ids)
    .fetch_all(db)
    .await
}

/// Groups fetched lines by recipe, preserving line order.
pub fn group_lines(lines: Vec<RecipeLine>) -> HashMap<Uuid, Vec<RecipeLine>> {
    let mut by_recipe: HashMap<Uuid, Vec<RecipeLine>> = HashMap::new();
    for line in lines {
        by_recipe.entry(line.recipe_id).or_default().push(line);
    }
    by_recipe
}
