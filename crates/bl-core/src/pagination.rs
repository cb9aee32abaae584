//! Pagination types for list endpoints

use serde::{Deserialize, Serialize};

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    #[serde(default)]
    pub offset: i64,
}

fn default_page_size() -> i64 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(page_size: i64, offset: i64) -> Self {
        Self {
            page_size: page_size.clamp(1, 500),
            offset: offset.max(0),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Paginated collection response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub total: i64,
    pub count: i64,
    pub page_size: i64,
    pub offset: i64,
    pub elements: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn new(elements: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            total,
            count: elements.len() as i64,
            page_size: pagination.page_size,
            offset: pagination.offset,
            elements,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            total: self.total,
            count: self.count,
            page_size: self.page_size,
            offset: self.offset,
            elements: self.elements.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::new(0, -5);
        assert_eq!(p.page_size, 1);
        assert_eq!(p.offset, 0);

        let p = Pagination::new(10_000, 40);
        assert_eq!(p.page_size, 500);
        assert_eq!(p.offset, 40);
    }

    #[test]
    fn test_paginated_result_counts() {
        let result = PaginatedResult::new(vec![1, 2, 3], 10, Pagination::default());
        assert_eq!(result.count, 3);
        assert_eq!(result.total, 10);
        assert_eq!(result.page_size, 20);
    }
}
