use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Per-100g nutrient facts of one ingredient, as resolved at aggregation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientFacts {
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub fat_per_100g: f64,
    pub carbs_per_100g: f64,
}

/// Derived nutrition values for a whole recipe. Stored alongside the recipe
/// and replaced wholesale on every create or update, never patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSnapshot {
    pub total_calories: f64,
    pub calories_per_serving: f64,
    pub total_protein: f64,
    pub protein_per_serving: f64,
    pub total_fat: f64,
    pub fat_per_serving: f64,
    pub total_carbs: f64,
    pub carbs_per_serving: f64,
}

/// Computes a recipe's nutrition snapshot from resolved ingredient facts and
/// quantities in grams. Pure and deterministic: per-nutrient total is
/// `sum(per100g * grams / 100)`, per-serving is `total / servings`.
pub fn compute_nutrition(
    lines: &[(NutrientFacts, f64)],
    servings: i32,
) -> Result<NutritionSnapshot, ApiError> {
    if servings <= 0 {
        return Err(ApiError::Validation("servings must be at least 1".into()));
    }

    let mut total_calories = 0.0;
    let mut total_protein = 0.0;
    let mut total_fat = 0.0;
    let mut total_carbs = 0.0;
    for (facts, grams) in lines {
        if *grams < 0.0 {
            return Err(ApiError::Validation(
                "ingredient quantity must not be negative".into(),
            ));
        }
        total_calories += facts.calories_per_100g * grams / 100.0;
        total_protein += facts.protein_per_100g * grams / 100.0;
        total_fat += facts.fat_per_100g * grams / 100.0;
        total_carbs += facts.carbs_per_100g * grams / 100.0;
    }

    let servings = f64::from(servings);
    Ok(NutritionSnapshot {
        total_calories,
        calories_per_serving: total_calories / servings,
        total_protein,
        protein_per_serving: total_protein / servings,
        total_fat,
        fat_per_serving: total_fat / servings,
        total_carbs,
        carbs_per_serving: total_carbs / servings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(calories: f64, protein: f64, fat: f64, carbs: f64) -> NutrientFacts {
        NutrientFacts {
            calories_per_100g: calories,
            protein_per_100g: protein,
            fat_per_100g: fat,
            carbs_per_100g: carbs,
        }
    }

    #[test]
    fn single_ingredient_example() {
        // 200 kcal/100g at 150g over 2 servings: total 300, per serving 150
        let lines = [(facts(200.0, 0.0, 0.0, 0.0), 150.0)];
        let snap = compute_nutrition(&lines, 2).unwrap();
        assert_eq!(snap.total_calories, 300.0);
        assert_eq!(snap.calories_per_serving, 150.0);
    }

    #[test]
    fn sums_all_macros_over_lines() {
        let lines = [
            (facts(100.0, 10.0, 5.0, 20.0), 200.0),
            (facts(50.0, 2.0, 1.0, 8.0), 50.0),
        ];
        let snap = compute_nutrition(&lines, 4).unwrap();
        assert_eq!(snap.total_calories, 225.0);
        assert_eq!(snap.total_protein, 21.0);
        assert_eq!(snap.total_fat, 10.5);
        assert_eq!(snap.total_carbs, 44.0);
        assert_eq!(snap.calories_per_serving, 56.25);
        assert_eq!(snap.protein_per_serving, 5.25);
        assert_eq!(snap.fat_per_serving, 2.625);
        assert_eq!(snap.carbs_per_serving, 11.0);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let lines = [
            (facts(123.4, 5.6, 7.8, 9.0), 137.0),
            (facts(88.0, 1.2, 0.4, 15.0), 42.5),
        ];
        let first = compute_nutrition(&lines, 3).unwrap();
        let second = compute_nutrition(&lines, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_or_negative_servings_is_rejected() {
        let lines = [(facts(200.0, 0.0, 0.0, 0.0), 100.0)];
        assert!(matches!(
            compute_nutrition(&lines, 0),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            compute_nutrition(&lines, -1),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let lines = [(facts(200.0, 0.0, 0.0, 0.0), -5.0)];
        assert!(matches!(
            compute_nutrition(&lines, 1),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn empty_lines_yield_zero_snapshot() {
        let snap = compute_nutrition(&[], 2).unwrap();
        assert_eq!(snap.total_calories, 0.0);
        assert_eq!(snap.carbs_per_serving, 0.0);
    }
}
