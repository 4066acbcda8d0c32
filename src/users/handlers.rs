use axum::{
    extract::{FromRef, OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password, is_strong_password, verify_password},
        AdminUser, AuthUser, JwtKeys,
    },
    error::ApiError,
    pagination::{ListQuery, Page, PageParams},
    state::AppState,
    users::{
        dto::{
            LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UpdateUserRequest,
            UserListItem, UserProfile,
        },
        repo::{self, NewUser},
    },
};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const SORTABLE: &[(&str, &str)] = &[
    ("first_name", "first_name"),
    ("family_name", "family_name"),
    ("email_id", "email_id"),
    ("createdAt", "created_at"),
];

fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    if payload.first_name.trim().is_empty()
        || payload.family_name.trim().is_empty()
        || payload.email_id.is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::Validation(
            "First name, family name, email, and password are required.".into(),
        ));
    }
    if !EMAIL_RE.is_match(&payload.email_id) {
        return Err(ApiError::Validation(
            "Invalid email format (e.g., name@example.com)".into(),
        ));
    }
    if !is_strong_password(&payload.password) {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters, include 1 letter and 1 number.".into(),
        ));
    }
    match payload.age {
        Some(age) if age >= 15 => {}
        _ => return Err(ApiError::Validation("Age must be above 15.".into())),
    }
    if !payload.is_admin
        && (payload.gender.is_none()
            || payload.height.is_none()
            || payload.weight.is_none()
            || payload.dietary_preference.is_none())
    {
        return Err(ApiError::Validation(
            "All profile fields are required for regular users.".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    payload.email_id = payload.email_id.trim().to_lowercase();
    validate_registration(&payload)?;

    if repo::find_by_email(&state.db, &payload.email_id).await?.is_some() {
        warn!(email = %payload.email_id, "email already registered");
        return Err(ApiError::Conflict("User already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(
        &state.db,
        NewUser {
            first_name: payload.first_name.trim(),
            family_name: payload.family_name.trim(),
            age: payload.age,
            gender: payload.gender.as_deref(),
            height: payload.height,
            weight: payload.weight,
            email_id: &payload.email_id,
            password_hash: &hash,
            dietary_preference: payload.dietary_preference.as_deref(),
            is_admin: payload.is_admin,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email_id: user.email_id,
            is_admin: user.is_admin,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email_id = payload.email_id.trim().to_lowercase();
    if payload.email_id.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Fill up all the fields".into()));
    }

    let user = repo::find_by_email(&state.db, &payload.email_id)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email_id, "login unknown email");
            ApiError::Authentication("email or password is not valid".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email_id, user_id = %user.id, "login invalid password");
        return Err(ApiError::Authentication(
            "email or password is not valid".into(),
        ));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id, &user.email_id, user.is_admin)?;

    info!(user_id = %user.id, email = %user.email_id, "user logged in");
    Ok(Json(LoginResponse { access_token }))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let row = repo::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    params: PageParams,
    Query(q): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Page<UserListItem>, ApiError> {
    let sort_col = q.sort_column(SORTABLE, "first_name");
    let users = repo::list(
        &state.db,
        &q.search,
        sort_col,
        q.dir(),
        params.limit,
        params.offset(),
    )
    .await?;
    let total = repo::count(&state.db, &q.search).await?;
    let items = users.into_iter().map(UserListItem::from).collect();
    Ok(Page::new(&uri, params, total, items))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let updated = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %id, "user deleted");
    Ok(Json(
        serde_json::json!({ "message": "User deleted successfully" }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".into(),
            family_name: "Lovelace".into(),
            email_id: "ada@example.com".into(),
            password: "abc123".into(),
            age: Some(30),
            gender: Some("female".into()),
            height: Some(170.0),
            weight: Some(60.0),
            dietary_preference: Some("vegetarian".into()),
            is_admin: false,
        }
    }

    #[test]
    fn accepts_a_complete_registration() {
        assert!(validate_registration(&valid_request()).is_ok());
    }

    #[test]
    fn age_boundary_is_fifteen() {
        let mut req = valid_request();
        req.age = Some(14);
        assert!(validate_registration(&req).is_err());
        req.age = Some(15);
        assert!(validate_registration(&req).is_ok());
        req.age = None;
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        let mut req = valid_request();
        req.password = "abcdef".into(); // no digit
        assert!(validate_registration(&req).is_err());
        req.password = "abc123".into();
        assert!(validate_registration(&req).is_ok());
    }

    #[test]
    fn regular_users_need_all_profile_fields() {
        let mut req = valid_request();
        req.dietary_preference = None;
        assert!(validate_registration(&req).is_err());
        req.is_admin = true;
        assert!(validate_registration(&req).is_ok());
    }

    #[test]
    fn email_regex_accepts_and_rejects() {
        assert!(EMAIL_RE.is_match("name@example.com"));
        assert!(EMAIL_RE.is_match("a.b@c.co"));
        assert!(!EMAIL_RE.is_match("no-at-sign"));
        assert!(!EMAIL_RE.is_match("two@@example.com"));
        assert!(!EMAIL_RE.is_match("missing@tld"));
        assert!(!EMAIL_RE.is_match("spa ce@example.com"));
    }
}
