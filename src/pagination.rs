use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts, HeaderValue, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};

pub const DEFAULT_LIMIT: i64 = 10;

/// Validated `page`/`limit` query parameters. Both must be positive integers
/// and `limit` must stay within the configured bound.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    /// Saturating so absurdly large page numbers yield an empty page instead
    /// of overflowing into a negative OFFSET.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Deserialize)]
struct RawPageParams {
    page: Option<i64>,
    limit: Option<i64>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for PageParams {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawPageParams>::try_from_uri(&parts.uri).map_err(|_| {
            ApiError::Validation("page and limit must be positive integers".into())
        })?;

        let page = raw.page.unwrap_or(1);
        let limit = raw.limit.unwrap_or(DEFAULT_LIMIT);
        if page < 1 || limit < 1 {
            return Err(ApiError::Validation(
                "page and limit must be positive integers".into(),
            ));
        }
        if limit > state.config.page_limit_max {
            return Err(ApiError::Validation(format!(
                "limit must not exceed {}",
                state.config.page_limit_max
            )));
        }
        Ok(Self { page, limit })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    /// `"desc"` sorts descending, anything else (including absent) ascending.
    pub fn parse(order: Option<&str>) -> Self {
        match order {
            Some("desc") => SortDir::Desc,
            _ => SortDir::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Common `search`/`sortBy`/`order` listing parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListQuery {
    pub fn dir(&self) -> SortDir {
        SortDir::parse(self.order.as_deref())
    }

    /// Resolves `sortBy` against a whitelist of sortable columns, falling back
    /// to `default` for unknown fields. SQL identifiers cannot be bound, so
    /// only whitelisted names ever reach a query string.
    pub fn sort_column(&self, allowed: &[(&str, &'static str)], default: &'static str) -> &'static str {
        match &self.sort_by {
            Some(field) => allowed
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, col)| *col)
                .unwrap_or(default),
            None => default,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    /// Each link keeps the original path and query, overriding only `page`
    /// and `limit`.
    pub fn build(uri: &Uri, current_page: i64, total_pages: i64, limit: i64) -> Self {
        let path = uri.path();
        let query = uri.query().unwrap_or("");
        Self {
            first: page_url(path, query, 1, limit),
            last: page_url(path, query, total_pages, limit),
            previous: (current_page > 1)
                .then(|| page_url(path, query, current_page - 1, limit)),
            next: (current_page < total_pages)
                .then(|| page_url(path, query, current_page + 1, limit)),
        }
    }

    fn as_link_header(&self) -> String {
        let mut parts = vec![
            format!("<{}>; rel=\"first\"", self.first),
            format!("<{}>; rel=\"last\"", self.last),
        ];
        if let Some(prev) = &self.previous {
            parts.push(format!("<{}>; rel=\"previous\"", prev));
        }
        if let Some(next) = &self.next {
            parts.push(format!("<{}>; rel=\"next\"", next));
        }
        parts.join(", ")
    }
}

fn page_url(path: &str, query: &str, page: i64, limit: i64) -> String {
    let mut params: Vec<(String, String)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|kv| match kv.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (kv.to_string(), String::new()),
        })
        .filter(|(k, _)| k != "page" && k != "limit")
        .collect();
    params.push(("page".into(), page.to_string()));
    params.push(("limit".into(), limit.to_string()));
    let qs = params
        .iter()
        .map(|(k, v)| {
            if v.is_empty() {
                k.clone()
            } else {
                format!("{k}={v}")
            }
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{qs}")
}

/// Uniform response envelope for every paginated listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub items: Vec<T>,
    pub links: PageLinks,
}

impl<T> Page<T> {
    pub fn new(uri: &Uri, params: PageParams, total_items: i64, items: Vec<T>) -> Self {
        let total_pages = total_pages(total_items, params.limit);
        Self {
            total_items,
            total_pages,
            current_page: params.page,
            links: PageLinks::build(uri, params.page, total_pages, params.limit),
            items,
        }
    }
}

pub fn total_pages(total_items: i64, limit: i64) -> i64 {
    (total_items + limit - 1) / limit
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let link_header = self.links.as_link_header();
        let mut res = Json(self).into_response();
        if let Ok(value) = HeaderValue::from_str(&link_header) {
            res.headers_mut().insert(header::LINK, value);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(95, 20), 5);
        assert_eq!(total_pages(100, 20), 5);
        assert_eq!(total_pages(101, 20), 6);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn first_page_has_next_but_no_previous() {
        let uri: Uri = "/api/ingredient?search=rice&page=1&limit=20"
            .parse()
            .unwrap();
        let links = PageLinks::build(&uri, 1, 5, 20);
        assert_eq!(links.first, "/api/ingredient?search=rice&page=1&limit=20");
        assert_eq!(links.last, "/api/ingredient?search=rice&page=5&limit=20");
        assert!(links.previous.is_none());
        assert_eq!(
            links.next.as_deref(),
            Some("/api/ingredient?search=rice&page=2&limit=20")
        );
    }

    #[test]
    fn last_page_has_previous_but_no_next() {
        let uri: Uri = "/api/ingredient?page=5&limit=20".parse().unwrap();
        let links = PageLinks::build(&uri, 5, 5, 20);
        assert_eq!(
            links.previous.as_deref(),
            Some("/api/ingredient?page=4&limit=20")
        );
        assert!(links.next.is_none());
    }

    #[test]
    fn links_override_only_page_and_limit() {
        let uri: Uri = "/api/mealbox?sortBy=price&order=desc&page=2&limit=5"
            .parse()
            .unwrap();
        let links = PageLinks::build(&uri, 2, 3, 5);
        assert_eq!(
            links.first,
            "/api/mealbox?sortBy=price&order=desc&page=1&limit=5"
        );
    }

    #[test]
    fn sort_dir_defaults_to_ascending() {
        assert_eq!(SortDir::parse(Some("desc")), SortDir::Desc);
        assert_eq!(SortDir::parse(Some("asc")), SortDir::Asc);
        assert_eq!(SortDir::parse(Some("anything")), SortDir::Asc);
        assert_eq!(SortDir::parse(None), SortDir::Asc);
    }

    #[test]
    fn unknown_sort_field_falls_back_to_default() {
        let q = ListQuery {
            search: String::new(),
            sort_by: Some("nope".into()),
            order: None,
        };
        let allowed = [("name", "name"), ("price", "price")];
        assert_eq!(q.sort_column(&allowed, "name"), "name");

        let q = ListQuery {
            sort_by: Some("price".into()),
            ..Default::default()
        };
        assert_eq!(q.sort_column(&allowed, "name"), "price");
    }

    #[tokio::test]
    async fn page_params_reject_non_positive_values() {
        use axum::http::Request;

        let state = AppState::fake();
        for query in ["page=0&limit=10", "page=1&limit=0", "page=abc", "limit=-2"] {
            let req = Request::builder()
                .uri(format!("/api/ingredient?{query}"))
                .body(())
                .unwrap();
            let (mut parts, _) = req.into_parts();
            let err = PageParams::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "query {query}");
        }
    }

    #[tokio::test]
    async fn huge_page_numbers_do_not_overflow_offset() {
        use axum::http::Request;

        let state = AppState::fake();
        let req = Request::builder()
            .uri(format!("/api/ingredient?page={}&limit=100", i64::MAX))
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let params = PageParams::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(params.offset(), i64::MAX);

        let params = PageParams {
            page: i64::MAX / 2,
            limit: 3,
        };
        assert!(params.offset() >= 0);
    }

    #[tokio::test]
    async fn page_params_apply_defaults_and_bounds() {
        use axum::http::Request;

        let state = AppState::fake();
        let req = Request::builder().uri("/api/ingredient").body(()).unwrap();
        let (mut parts, _) = req.into_parts();
        let params = PageParams::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);

        let req = Request::builder()
            .uri("/api/ingredient?page=3&limit=101")
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let err = PageParams::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
