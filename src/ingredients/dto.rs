use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ingredients::repo::Ingredient;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDto {
    pub id: Uuid,
    pub name: String,
    pub quantity_in_stock: f64,
    pub unit: Option<String>,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub fat_per_100g: f64,
    pub carbs_per_100g: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Ingredient> for IngredientDto {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            quantity_in_stock: i.quantity_in_stock,
            unit: i.unit,
            calories_per_100g: i.calories_per_100g,
            protein_per_100g: i.protein_per_100g,
            fat_per_100g: i.fat_per_100g,
            carbs_per_100g: i.carbs_per_100g,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    pub name: String,
    #[serde(default)]
    pub quantity_in_stock: f64,
    pub unit: Option<String>,
    #[serde(default)]
    pub calories_per_100g: f64,
    #[serde(default)]
    pub protein_per_100g: f64,
    #[serde(default)]
    pub fat_per_100g: f64,
    #[serde(default)]
    pub carbs_per_100g: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub quantity_in_stock: Option<f64>,
    pub unit: Option<String>,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
}
