// src/models/pagination.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page number (1-based) and page size from the query string
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Paginated list response
/// DOCUMENTATION: Shared envelope for every list endpoint
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    /// Items on this page
    pub data: Vec<T>,

    /// Total number of matches (regardless of pagination)
    pub total_count: i64,

    /// Current page number
    pub page: i64,

    /// Results per page
    pub limit: i64,

    /// Whether more results exist on next page
    pub has_more: bool,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total_count: i64, params: PageParams) -> Self {
        let page = params.page();
        let limit = params.limit();
        Self {
            data,
            total_count,
            page,
            limit,
            has_more: total_count > page.saturating_mul(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);

        let params = PageParams {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_and_has_more() {
        let params = PageParams {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(params.offset(), 20);

        let page = Paginated::new(vec![1, 2, 3], 30, params);
        assert!(!page.has_more);

        let page = Paginated::new(vec![1, 2, 3], 31, params);
        assert!(page.has_more);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params = PageParams {
            page: Some(i64::MAX),
            limit: Some(20),
        };
        assert_eq!(params.offset(), i64::MAX);

        let page = Paginated::<i32>::new(vec![], 5, PageParams {
            page: Some(i64::MAX / 2),
            limit: None,
        });
        assert_eq!(page.page, i64::MAX / 2);
        assert!(!page.has_more);
    }
}
