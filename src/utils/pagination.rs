use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginatedMeta,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaginatedMeta {
    pub total: u32,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u32, pagination: &Pagination) -> Paginated<T> {
        Self {
            items,
            meta: PaginatedMeta {
                total,
                page: pagination.page,
                limit: pagination.limit,
                total_pages: total.div_ceil(pagination.limit.max(1)),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Normalised paging window. Out-of-range values fall back to the defaults
/// instead of being rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(page) if page >= 1 => u32::try_from(page).unwrap_or(DEFAULT_PAGE),
            _ => DEFAULT_PAGE,
        };

        let limit = match limit {
            Some(limit) if (1..=MAX_LIMIT as i64).contains(&limit) => limit as u32,
            _ => DEFAULT_LIMIT,
        };

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Deserialize)]
struct RawPagination {
    page: Option<i64>,
    limit: Option<i64>,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extract::<Query<RawPagination>>().await {
            Ok(Query(raw)) => Ok(Pagination::new(raw.page, raw.limit)),
            _ => Err(
                Error::InvalidArgument(String::from("Invalid pagination options")).into_response(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        assert_eq!(Pagination::new(None, None), Pagination::default());
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination::default());
        assert_eq!(Pagination::new(Some(-3), Some(-1)), Pagination::default());
    }

    #[test]
    fn limit_above_cap_uses_default() {
        let pagination = Pagination::new(Some(2), Some(101));
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.limit, DEFAULT_LIMIT);

        let pagination = Pagination::new(Some(2), Some(100));
        assert_eq!(pagination.limit, 100);
    }

    #[test]
    fn offset_follows_page() {
        let pagination = Pagination::new(Some(3), Some(20));
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);
    }

    #[test]
    fn meta_counts_pages() {
        let paginated = Paginated::new(vec![1, 2, 3], 21, &Pagination::new(Some(1), Some(10)));
        assert_eq!(paginated.meta.total_pages, 3);

        let empty = Paginated::<u8>::new(vec![], 0, &Pagination::default());
        assert_eq!(empty.meta.total_pages, 0);
    }
}
