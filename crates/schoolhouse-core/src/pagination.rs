//! Pagination for list endpoints.
//!
//! Two styles are accepted on the query string:
//!
//! - `limit` + `offset`: skip `offset` rows
//! - `limit` + `page`: 1-indexed pages, takes precedence over `offset`
//!
//! `limit` defaults to 10 and is clamped to `[1, 100]`.
//!
//! ```ignore
//! async fn list(Query(params): Query<PaginationParams>) -> Result<Json<Page>, AppError> {
//!     let rows = fetch(params.limit(), params.offset()).await?;
//!     let total = count().await?;
//!     Ok(Json(Page { data: rows, meta: PaginationMeta::new(total, &params) }))
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_i64;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Metadata attached to every paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching rows
    pub total: i64,
    /// The limit that was applied
    pub limit: i64,
    /// Rows skipped (absent for page-based requests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Current page (present for page-based requests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let offset = params.offset();
        let page = params.page();

        Self {
            total,
            limit,
            offset: if page.is_some() { None } else { Some(offset) },
            page,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number, 1-indexed
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Effective offset; derived from `page` when one was given.
    #[must_use]
    pub fn offset(&self) -> i64 {
        match self.page {
            Some(page) => (page.max(1) - 1).saturating_mul(self.limit()),
            None => self.offset.unwrap_or(0).max(0),
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}
