//! Common DTOs used across the API

use serde::Serialize;

/// Standard API response envelope
///
/// Success responses carry `success: true` plus data; error responses are
/// produced by `AppError` with `success: false` and an error code.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Response message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Create a success response with data and message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Create a data-less acknowledgment
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let resp = ApiResponse::success("test");
        assert!(resp.success);
        assert_eq!(resp.data, Some("test"));
        assert!(resp.message.is_none());
    }

    #[test]
    fn test_api_response_with_message() {
        let resp = ApiResponse::with_message("data", "created");
        assert!(resp.success);
        assert_eq!(resp.message, Some("created".to_string()));
    }

    #[test]
    fn test_acknowledged_skips_data() {
        let resp = ApiResponse::acknowledged("Status received");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(!json.contains("\"data\""));
    }
}
