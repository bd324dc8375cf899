//! Page-based pagination shared by the catalog listings

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw `page` / `pageSize` query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

/// Normalized page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    /// Non-positive values fall back to defaults; page size is capped.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// One page of results
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub lists: Vec<T>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl<T> Page<T> {
    pub fn new(lists: Vec<T>, pagination: Pagination, total_items: i64) -> Self {
        let total_pages = (total_items + pagination.page_size - 1) / pagination.page_size;

        Self {
            lists,
            current_page: pagination.page,
            total_pages,
            total_items,
        }
    }
}
