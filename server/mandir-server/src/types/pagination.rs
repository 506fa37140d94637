//! Pagination types shared by every list endpoint

use crate::error::{ApiResponse, PaginationInfo, ResponseMetadata};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Standard pagination query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema, Clone, Default)]
pub struct PaginationParams {
    #[param(example = 1, minimum = 1)]
    pub page: Option<u32>,

    #[param(example = 20, minimum = 1, maximum = 100)]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Page number, 1-based
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, clamped to [1, 100]
    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// SQL OFFSET for the current page
    pub fn offset(&self) -> i64 {
        ((self.page() - 1) * self.page_size()) as i64
    }

    /// SQL LIMIT for the current page
    pub fn limit(&self) -> i64 {
        self.page_size() as i64
    }

    /// Wrap a data page with pagination metadata
    pub fn wrap_response<T>(&self, data: T, total_count: i64) -> ApiResponse<T> {
        let page_size = self.page_size();
        let total_pages = if total_count <= 0 {
            1
        } else {
            ((total_count as u64).div_ceil(page_size as u64)) as u32
        };

        ApiResponse {
            success: true,
            data,
            metadata: Some(ResponseMetadata {
                pagination: Some(PaginationInfo {
                    page: self.page(),
                    page_size,
                    total_pages,
                    has_next: self.page() < total_pages,
                    has_previous: self.page() > 1,
                }),
                total_count: Some(total_count),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_calculation() {
        let params = PaginationParams {
            page: Some(3),
            page_size: Some(10),
        };
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_page_size_clamped() {
        let params = PaginationParams {
            page: Some(0),
            page_size: Some(500),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 100);
    }

    #[test]
    fn test_wrap_response_metadata() {
        let params = PaginationParams {
            page: Some(2),
            page_size: Some(20),
        };
        let response = params.wrap_response(vec![1, 2, 3], 101);
        let meta = response.metadata.unwrap();
        let pagination = meta.pagination.unwrap();
        assert_eq!(pagination.total_pages, 6);
        assert!(pagination.has_next);
        assert!(pagination.has_previous);
        assert_eq!(meta.total_count, Some(101));
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let params = PaginationParams::default();
        let response = params.wrap_response(Vec::<i32>::new(), 0);
        let pagination = response.metadata.unwrap().pagination.unwrap();
        assert_eq!(pagination.total_pages, 1);
        assert!(!pagination.has_next);
    }
}
