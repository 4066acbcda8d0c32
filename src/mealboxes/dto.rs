use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::mealboxes::repo::MealBox;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealBoxDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub price: Option<f64>,
    pub stock_available: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<MealBox> for MealBoxDto {
    fn from(b: MealBox) -> Self {
        Self {
            id: b.id,
            name: b.name,
            description: b.description,
            calories: b.calories,
            price: b.price,
            stock_available: b.stock_available,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealBoxRequest {
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub price: Option<f64>,
    pub stock_available: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealBoxRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub calories: Option<f64>,
    pub price: Option<f64>,
    pub stock_available: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChangeResponse {
    pub message: &'static str,
    pub updated_meal_box: MealBoxDto,
}
