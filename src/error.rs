// Shared error response format for the Workzup auth API
// Every error surface serializes to this JSON shape

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

/// Consistent error response structure
///
/// Provides a machine-readable `error_code` alongside the human-readable
/// `message`. `details` carries field-level validation errors when present
/// and is omitted from the JSON otherwise.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error_code: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_omitted_when_absent() {
        let body = ErrorResponse::new("NOT_FOUND", "User not found");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["error_code"], "NOT_FOUND");
        assert_eq!(json["message"], "User not found");
    }

    #[test]
    fn test_details_serialized_when_present() {
        let body = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
            .with_details(Some(serde_json::json!({"email": "invalid"})));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"]["email"], "invalid");
    }
}
