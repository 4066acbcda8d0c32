use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub family_name: String,
    pub email_id: String,
    pub password: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email_id: String,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Caller-visible profile, never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub email_id: String,
    pub dietary_preference: Option<String>,
    pub is_admin: bool,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            family_name: u.family_name,
            age: u.age,
            gender: u.gender,
            height: u.height,
            weight: u.weight,
            email_id: u.email_id,
            dietary_preference: u.dietary_preference,
            is_admin: u.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub email_id: String,
    pub is_admin: bool,
}

impl From<User> for UserListItem {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            family_name: u.family_name,
            email_id: u.email_id,
            is_admin: u.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub family_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub dietary_preference: Option<String>,
}
