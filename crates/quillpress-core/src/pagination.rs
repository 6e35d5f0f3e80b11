//! Pagination utilities for API responses.
//!
//! Listing endpoints accept `page` and `limit` query parameters. They are
//! never rejected for being out of range; [`resolve`] clamps them instead:
//!
//! - `limit` falls back to the configured default when missing (or zero) and
//!   is clamped to `[1, max_limit]`
//! - `page` falls back to 1 and is clamped to a minimum of 1
//!
//! The resolved [`PageWindow`] carries the `skip`/`take` pair used in the SQL
//! query and is turned into the response envelope with
//! [`PageWindow::into_page`] once the matching-row count is known.
//!
//! # Example JSON Response
//!
//! ```json
//! {
//!   "data": [...],
//!   "pagination": {
//!     "page": 2,
//!     "limit": 10,
//!     "total": 25,
//!     "pages": 3,
//!     "has_next": true,
//!     "has_prev": true
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_lenient_i64;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Query parameters for page-based pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub page: Option<i64>,
    /// Items per page (clamped to the configured maximum, default: 10)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Resolves the requested page against the given limits.
    #[must_use]
    pub fn window(&self, default_limit: i64, max_limit: i64) -> PageWindow {
        resolve(self.page, self.limit, default_limit, max_limit)
    }
}

/// A normalized page request: `skip`/`take` for the query, `page`/`limit`
/// for the response metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: i64,
    pub take: i64,
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Wraps one page of rows in the response envelope.
    pub fn into_page<T>(self, data: Vec<T>, total: i64) -> Paginated<T> {
        build_page(data, total, self.page, self.limit)
    }
}

/// Clamps raw page/limit input into a valid [`PageWindow`].
///
/// A zero `limit` counts as not supplied. Never fails.
#[must_use]
pub fn resolve(
    page: Option<i64>,
    limit: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> PageWindow {
    let max_limit = max_limit.max(1);
    let limit = limit
        .filter(|l| *l != 0)
        .unwrap_or(default_limit)
        .clamp(1, max_limit);
    let page = page.unwrap_or(1).max(1);

    PageWindow {
        skip: (page - 1).saturating_mul(limit),
        take: limit,
        page,
        limit,
    }
}

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Items per page that was applied
    pub limit: i64,
    /// Total number of matching items across all pages
    pub total: i64,
    /// Number of pages, `ceil(total / limit)`
    pub pages: i64,
    /// Whether a page exists after this one
    pub has_next: bool,
    /// Whether a page exists before this one
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total = total.max(0);
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };

        Self {
            page,
            limit,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// A page of results plus page metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Converts every row, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Builds the paginated envelope.
///
/// `total` is the true number of matching rows, independent of `data.len()`.
pub fn build_page<T>(data: Vec<T>, total: i64, page: i64, limit: i64) -> Paginated<T> {
    Paginated {
        data,
        pagination: PaginationMeta::new(total, page, limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let window = resolve(None, None, DEFAULT_LIMIT, MAX_LIMIT);
        assert_eq!(
            window,
            PageWindow {
                skip: 0,
                take: 10,
                page: 1,
                limit: 10
            }
        );
    }

    #[test]
    fn test_resolve_within_bounds() {
        for page in 1..=5 {
            for limit in [1, 7, 50, 100] {
                let window = resolve(Some(page), Some(limit), DEFAULT_LIMIT, MAX_LIMIT);
                assert_eq!(window.skip, (page - 1) * limit);
                assert_eq!(window.take, limit);
                assert_eq!(window.page, page);
                assert_eq!(window.limit, limit);
            }
        }
    }

    #[test]
    fn test_resolve_clamps_limit() {
        let test_cases = vec![
            (Some(150), 100),
            (Some(101), 100),
            (Some(-1), 1),
            (Some(-100), 1),
            (Some(0), 10),
            (None, 10),
        ];

        for (input, expected) in test_cases {
            let window = resolve(Some(1), input, DEFAULT_LIMIT, MAX_LIMIT);
            assert_eq!(window.limit, expected, "limit input {:?}", input);
            assert_eq!(window.take, expected);
        }
    }

    #[test]
    fn test_resolve_clamps_page() {
        for input in [None, Some(0), Some(-3)] {
            let window = resolve(input, Some(20), DEFAULT_LIMIT, MAX_LIMIT);
            assert_eq!(window.page, 1);
            assert_eq!(window.skip, 0);
        }
    }

    #[test]
    fn test_resolve_respects_configured_limits() {
        let window = resolve(Some(3), None, 25, 50);
        assert_eq!(window.limit, 25);
        assert_eq!(window.skip, 50);

        let window = resolve(Some(1), Some(80), 25, 50);
        assert_eq!(window.limit, 50);
    }

    #[test]
    fn test_params_window() {
        let params = PaginationParams::new(Some(4), Some(5));
        let window = params.window(DEFAULT_LIMIT, MAX_LIMIT);
        assert_eq!(window.skip, 15);
        assert_eq!(window.take, 5);
    }

    #[test]
    fn test_build_page_empty() {
        let page = build_page(Vec::<u8>::new(), 0, 1, 10);
        assert_eq!(page.pagination.pages, 0);
        assert!(!page.pagination.has_next);
        assert!(!page.pagination.has_prev);
    }

    #[test]
    fn test_build_page_middle() {
        let page = build_page(vec![1; 10], 25, 2, 10);
        assert_eq!(page.pagination.pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
        assert_eq!(page.pagination.total, 25);
    }

    #[test]
    fn test_build_page_last_page_is_short() {
        let page = build_page(vec![1; 5], 25, 3, 10);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.pagination.total, 25);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[test]
    fn test_build_page_exact_multiple() {
        let meta = PaginationMeta::new(30, 3, 10);
        assert_eq!(meta.pages, 3);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_window_into_page() {
        let window = resolve(Some(2), Some(10), DEFAULT_LIMIT, MAX_LIMIT);
        let page = window.into_page(vec!["a", "b"], 12);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.pages, 2);
        assert!(!page.pagination.has_next);
    }

    #[test]
    fn test_paginated_map_keeps_meta() {
        let page = build_page(vec![1, 2, 3], 3, 1, 10).map(|n| n * 2);
        assert_eq!(page.data, vec![2, 4, 6]);
        assert_eq!(page.pagination.total, 3);
    }

    #[test]
    fn test_pagination_meta_serialize() {
        let meta = PaginationMeta::new(25, 2, 10);
        let serialized = serde_json::to_string(&meta).unwrap();
        assert!(serialized.contains(r#""pages":3"#));
        assert!(serialized.contains(r#""has_next":true"#));
        assert!(serialized.contains(r#""has_prev":true"#));
    }

    #[test]
    fn test_pagination_params_deserialize_strings() {
        let json = r#"{"page":"3","limit":"25"}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params, PaginationParams::new(Some(3), Some(25)));
    }

    #[test]
    fn test_pagination_params_deserialize_empty_strings() {
        let json = r#"{"page":"","limit":""}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params, PaginationParams::default());
    }

    #[test]
    fn test_non_numeric_params_fall_back_to_defaults() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"two","limit":"abc"}"#).unwrap();
        assert_eq!(params.page, None);
        assert_eq!(params.limit, None);

        let window = params.window(DEFAULT_LIMIT, MAX_LIMIT);
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_oversized_params_are_clamped() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"3","limit":"99999999999999999999"}"#).unwrap();
        assert_eq!(params.limit, Some(i64::MAX));

        let window = params.window(DEFAULT_LIMIT, MAX_LIMIT);
        assert_eq!(window.limit, MAX_LIMIT);
        assert_eq!(window.skip, 200);

        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"-99999999999999999999","limit":"-5"}"#).unwrap();
        let window = params.window(DEFAULT_LIMIT, MAX_LIMIT);
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, 1);
    }
}
