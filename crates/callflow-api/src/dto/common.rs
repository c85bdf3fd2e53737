//! Common DTOs used across the API

use callflow_core::traits::{PaginatedResponse, Pagination, PaginationMeta};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    /// Create a success response with data and message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
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
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Clamped pagination for database queries
    pub fn clamped(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    /// Wrap a page of data with pagination metadata
    pub fn paginate<T>(&self, data: Vec<T>, total: i64) -> PaginatedResponse<T> {
        let p = self.clamped();
        PaginatedResponse {
            data,
            pagination: PaginationMeta::new(total, p.page, p.per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_creation() {
        let response = ApiResponse::success("test data");
        assert_eq!(response.data, "test data");
        assert!(response.message.is_none());

        let response = ApiResponse::with_message("data", "Operation successful");
        assert_eq!(response.data, "data");
        assert_eq!(response.message, Some("Operation successful".to_string()));
    }

    #[test]
    fn test_paginate() {
        let params = PaginationParams {
            page: 2,
            per_page: 25,
        };

        let response = params.paginate(vec![1, 2, 3, 4, 5], 100);

        assert_eq!(response.data.len(), 5);
        assert_eq!(response.pagination.total, 100);
        assert_eq!(response.pagination.page, 2);
        assert_eq!(response.pagination.per_page, 25);
        assert_eq!(response.pagination.total_pages, 4);
    }

    #[test]
    fn test_pagination_params_clamping() {
        let params = PaginationParams {
            page: 0,
            per_page: 5000,
        };

        let p = params.clamped();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1000);
    }
}
