//! Pagination types for API responses

use serde::{Deserialize, Serialize};

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    15
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(default_page(), default_per_page())
    }
}

impl PaginationParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Re-applies the bounds after deserialization
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.per_page)
    }

    /// Calculate the SQL offset
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Calculate the SQL limit
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Slices an in-memory collection to this page
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as i64;
        let data = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect();
        Page::new(data, total, self)
    }
}

/// One page of a collection
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        let last_page = ((total + params.per_page - 1) / params.per_page).max(1);
        Self {
            data,
            current_page: params.page,
            per_page: params.per_page,
            total,
            last_page,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
        }
    }
}
