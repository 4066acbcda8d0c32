mod dto;
pub mod handlers;
pub mod repo;
pub mod summary;

use axum::{routing::get, Router};
use time::{macros::format_description, Date};

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/meallog",
            get(handlers::list_meal_logs).post(handlers::create_meal_log),
        )
        .route("/meallog/summary", get(handlers::daily_summary))
        .route(
            "/meallog/:id",
            get(handlers::get_meal_log)
                .put(handlers::update_meal_log)
                .delete(handlers::delete_meal_log),
        )
}

/// Calendar days are naive UTC dates rendered as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

pub fn parse_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::Validation("date must be formatted as YYYY-MM-DD".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn date_roundtrip() {
        let date = Date::from_calendar_date(2025, Month::March, 7).unwrap();
        assert_eq!(format_date(date), "2025-03-07");
        assert_eq!(parse_date("2025-03-07").unwrap(), date);
    }

    #[test]
    fn bad_date_is_a_validation_error() {
        assert!(matches!(
            parse_date("07/03/2025"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            parse_date("2025-13-40"),
            Err(ApiError::Validation(_))
        ));
    }
}
