use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::pagination::SortDir;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub email_id: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub dietary_preference: Option<String>,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, first_name, family_name, age, gender, height, weight, \
     email_id, password_hash, dietary_preference, is_admin, created_at";

pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email_id = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub family_name: &'a str,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub email_id: &'a str,
    pub password_hash: &'a str,
    pub dietary_preference: Option<&'a str>,
    pub is_admin: bool,
}

pub async fn create(db: &PgPool, new: NewUser<'_>) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users \
             (first_name, family_name, age, gender, height, weight, email_id, \
              password_hash, dietary_preference, is_admin) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(new.first_name)
    .bind(new.family_name)
    .bind(new.age)
    .bind(new.gender)
    .bind(new.height)
    .bind(new.weight)
    .bind(new.email_id)
    .bind(new.password_hash)
    .bind(new.dietary_preference)
    .bind(new.is_admin)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    req: &crate::users::dto::UpdateUserRequest,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
             first_name = COALESCE($2, first_name), \
             family_name = COALESCE($3, family_name), \
             age = COALESCE($4, age), \
             gender = COALESCE($5, gender), \
             height = COALESCE($6, height), \
             weight = COALESCE($7, weight), \
             dietary_preference = COALESCE($8, dietary_preference) \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(req.first_name.as_deref())
    .bind(req.family_name.as_deref())
    .bind(req.age)
    .bind(req.gender.as_deref())
    .bind(req.height)
    .bind(req.weight)
    .bind(req.dietary_preference.as_deref())
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(
    db: &PgPool,
    search: &str,
    sort_col: &str,
    dir: SortDir,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users \
         WHERE first_name ILIKE $1 OR family_name ILIKE $1 OR email_id ILIKE $1 \
         ORDER BY {sort_col} {} LIMIT $2 OFFSET $3",
        dir.as_sql()
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(format!("%{search}%"))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count(db: &PgPool, search: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users \
         WHERE first_name ILIKE $1 OR family_name ILIKE $1 OR email_id ILIKE $1",
    )
    .bind(format!("%{search}%"))
    .fetch_one(db)
    .await
}
