use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::meallogs::repo::{LogRecipeRow, MealLogRow};
use crate::meallogs::summary::MacroSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snacks => "snacks",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMealLogRequest {
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(rename = "recipeIds")]
    pub recipe_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMealLogRequest {
    #[serde(rename = "mealType")]
    pub meal_type: Option<MealType>,
    #[serde(rename = "recipeIds")]
    pub recipe_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct MealLogListQuery {
    #[serde(rename = "mealType")]
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecipeDto {
    pub id: Uuid,
    pub name: String,
    pub calories_per_serving: f64,
    pub protein_per_serving: f64,
    pub fat_per_serving: f64,
    pub carbs_per_serving: f64,
}

impl From<LogRecipeRow> for LogRecipeDto {
    fn from(r: LogRecipeRow) -> Self {
        Self {
            id: r.recipe_id,
            name: r.name,
            calories_per_serving: r.calories_per_serving,
            protein_per_serving: r.protein_per_serving,
            fat_per_serving: r.fat_per_serving,
            carbs_per_serving: r.carbs_per_serving,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogDto {
    pub id: Uuid,
    pub meal_type: String,
    pub date: String,
    pub total_calories: f64,
    /// Recipes still resolvable at read time; dangling references are omitted.
    pub recipes: Vec<LogRecipeDto>,
}

impl MealLogDto {
    pub fn from_parts(log: MealLogRow, recipes: Vec<LogRecipeRow>) -> Self {
        Self {
            id: log.id,
            meal_type: log.meal_type,
            date: crate::meallogs::format_date(log.log_date),
            total_calories: log.total_calories,
            recipes: recipes.into_iter().map(LogRecipeDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTypeSummaryDto {
    pub meal_type: &'static str,
    #[serde(flatten)]
    pub totals: MacroSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummaryDto {
    pub date: String,
    pub meal_types: Vec<MealTypeSummaryDto>,
}
