use serde::{Deserialize, Serialize};

/// Generic API response wrapper used across all handlers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Create a successful response without data
    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            success: false,
            message: msg.clone(),
            data: None,
            error: Some(msg),
        }
    }

    /// Create an error response with custom error message
    pub fn error_with_message(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// A page of results plus the counters clients use to render pagination.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
    pub total_count: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl<T> PagedResponse<T> {
    pub fn new(data: Vec<T>, total_count: i64, page: i64, limit: i64) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            total_count,
            page,
            total_pages: total_pages(total_count, limit),
        }
    }
}

/// `ceil(total / limit)`, zero when there is nothing to show.
pub fn total_pages(total_count: i64, limit: i64) -> i64 {
    if total_count <= 0 || limit <= 0 {
        return 0;
    }
    (total_count + limit - 1) / limit
}
