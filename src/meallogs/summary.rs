use serde::Serialize;

/// One serving's worth of macros, also used as the rollup result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroSummary {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

/// Sums per-serving macros across log entries; one serving is assumed per
/// logged recipe.
pub fn summarize<I>(per_serving: I) -> MacroSummary
where
    I: IntoIterator<Item = MacroSummary>,
{
    per_serving
        .into_iter()
        .fold(MacroSummary::default(), |acc, m| MacroSummary {
            calories: acc.calories + m.calories,
            protein: acc.protein + m.protein,
            fat: acc.fat + m.fat,
            carbs: acc.carbs + m.carbs,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakfast_rollup_sums_per_serving_calories() {
        let entries = [
            MacroSummary {
                calories: 150.0,
                protein: 10.0,
                fat: 5.0,
                carbs: 20.0,
            },
            MacroSummary {
                calories: 250.0,
                protein: 12.0,
                fat: 8.0,
                carbs: 30.0,
            },
        ];
        let total = summarize(entries);
        assert_eq!(total.calories, 400.0);
        assert_eq!(total.protein, 22.0);
        assert_eq!(total.fat, 13.0);
        assert_eq!(total.carbs, 50.0);
    }

    #[test]
    fn empty_log_sums_to_zero() {
        assert_eq!(summarize([]), MacroSummary::default());
    }
}
