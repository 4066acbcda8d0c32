use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::mealboxes::dto::{CreateMealBoxRequest, UpdateMealBoxRequest};
use crate::pagination::SortDir;

/// Fixed number of units added by every restock request.
pub const RESTOCK_INCREMENT: i32 = 10;

#[derive(Debug, Clone, FromRow)]
pub struct MealBox {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub price: Option<f64>,
    pub stock_available: i32,
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, description, calories, price, stock_available, created_at";

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<MealBox>> {
    sqlx::query_as::<_, MealBox>(&format!("SELECT {COLUMNS} FROM meal_boxes WHERE id = $1"))
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
) -> sqlx::Result<Vec<MealBox>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM meal_boxes WHERE name ILIKE $1 \
         ORDER BY {sort_col} {} LIMIT $2 OFFSET $3",
        dir.as_sql()
    );
    sqlx::query_as::<_, MealBox>(&sql)
        .bind(format!("%{search}%"))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count(db: &PgPool, search: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM meal_boxes WHERE name ILIKE $1")
        .bind(format!("%{search}%"))
        .fetch_one(db)
        .await
}

pub async fn create(db: &PgPool, req: &CreateMealBoxRequest) -> sqlx::Result<MealBox> {
    sqlx::query_as::<_, MealBox>(&format!(
        "INSERT INTO meal_boxes (name, description, calories, price, stock_available) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(&req.name)
    .bind(req.description.as_deref())
    .bind(req.calories)
    .bind(req.price)
    .bind(req.stock_available)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    req: &UpdateMealBoxRequest,
) -> sqlx::Result<Option<MealBox>> {
    sqlx::query_as::<_, MealBox>(&format!(
        "UPDATE meal_boxes SET \
             name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             calories = COALESCE($4, calories), \
             price = COALESCE($5, price), \
             stock_available = COALESCE($6, stock_available) \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(req.name.as_deref())
    .bind(req.description.as_deref())
    .bind(req.calories)
    .bind(req.price)
    .bind(req.stock_available)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM meal_boxes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Conditional decrement: the stock check and the write are one statement, so
/// two concurrent orders can never both pass the guard on a stale read.
/// Returns `None` when the box is missing or the stock is insufficient.
pub async fn order(db: &PgPool, id: Uuid, quantity: i32) -> sqlx::Result<Option<MealBox>> {
    sqlx::query_as::<_, MealBox>(&format!(
        "UPDATE meal_boxes SET stock_available = stock_available - $2 \
         WHERE id = $1 AND stock_available >= $2 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(quantity)
    .fetch_optional(db)
    .await
}

pub async fn restock(db: &PgPool, id: Uuid) -> sqlx::Result<Option<MealBox>> {
    sqlx::query_as::<_, MealBox>(&format!(
        "UPDATE meal_boxes SET stock_available = stock_available + $2 \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(RESTOCK_INCREMENT)
    .fetch_optional(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_box(db: &PgPool, name: &str, stock: i32) -> MealBox {
        create(
            db,
            &CreateMealBoxRequest {
                name: name.into(),
                description: None,
                calories: 450.0,
                price: Some(7.5),
                stock_available: stock,
            },
        )
        .await
        .expect("seed meal box")
    }

    #[sqlx::test]
    async fn order_beyond_stock_is_rejected_and_stock_unchanged(pool: PgPool) {
        let b = seed_box(&pool, "Paneer Bowl", 3).await;
        assert!(order(&pool, b.id, 5).await.unwrap().is_none());

        let after = find_by_id(&pool, b.id).await.unwrap().unwrap();
        assert_eq!(after.stock_available, 3);
    }

    #[sqlx::test]
    async fn order_decrements_stock(pool: PgPool) {
        let b = seed_box(&pool, "Quinoa Box", 3).await;
        let updated = order(&pool, b.id, 2).await.unwrap().expect("order");
        assert_eq!(updated.stock_available, 1);

        let after = find_by_id(&pool, b.id).await.unwrap().unwrap();
        assert_eq!(after.stock_available, 1);
    }

    #[sqlx::test]
    async fn order_on_missing_box_returns_none(pool: PgPool) {
        assert!(order(&pool, Uuid::new_v4(), 1).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn restock_adds_the_fixed_increment(pool: PgPool) {
        let b = seed_box(&pool, "Lentil Box", 0).await;
        let updated = restock(&pool, b.id).await.unwrap().expect("restock");
        assert_eq!(updated.stock_available, RESTOCK_INCREMENT);
    }
}
