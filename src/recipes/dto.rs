use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::nutrition::NutritionSnapshot;
use crate::recipes::repo::{Recipe, RecipeLine};

#[derive(Debug, Deserialize)]
pub struct RecipeLineRequest {
    #[serde(rename = "ingredientId")]
    pub ingredient_id: Uuid,
    pub quantity: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub servings: i32,
    pub ingredients: Vec<RecipeLineRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineDto {
    pub ingredient_id: Uuid,
    /// Resolved on read; `None` when the ingredient was deleted after the
    /// recipe was computed.
    pub name: Option<String>,
    pub quantity: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub id: Uuid,
    pub name: String,
    pub servings: i32,
    pub ingredients: Vec<RecipeLineDto>,
    #[serde(flatten)]
    pub nutrition: NutritionSnapshot,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl RecipeDto {
    pub fn from_parts(recipe: Recipe, lines: Vec<RecipeLine>) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            servings: recipe.servings,
            ingredients: lines
                .into_iter()
                .map(|l| RecipeLineDto {
                    ingredient_id: l.ingredient_id,
                    name: l.ingredient_name,
                    quantity: l.quantity_grams,
                })
                .collect(),
            nutrition: NutritionSnapshot {
                total_calories: recipe.total_calories,
                calories_per_serving: recipe.calories_per_serving,
                total_protein: recipe.total_protein,
                protein_per_serving: recipe.protein_per_serving,
                total_fat: recipe.total_fat,
                fat_per_serving: recipe.fat_per_serving,
                total_carbs: recipe.total_carbs,
                carbs_per_serving: recipe.carbs_per_serving,
            },
            created_by: recipe.created_by,
            created_at: recipe.created_at,
        }
    }
}
