//! Common types

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Page request as sent by the dashboard (`?page=&limit=`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    /// Builds a page request from optional query values, falling back to the
    /// defaults for missing or zero values and capping the limit.
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// Paging metadata returned next to list data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl PageMeta {
    pub fn new(total: i64, pagination: Pagination) -> Self {
        Self { total, page: pagination.page, limit: pagination.limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::from_query(None, None);
        assert_eq!(p, Pagination { page: 1, limit: 50 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_caps_limit() {
        let p = Pagination::from_query(Some(3), Some(500));
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn test_pagination_zero_values() {
        let p = Pagination::from_query(Some(0), Some(0));
        assert_eq!(p, Pagination::default());
    }
}
