use serde::{Deserialize, Serialize};

/// Error body returned by the billing server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// The main error message
    pub message: String,
    /// Optional additional details about the error
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Decode a raw response body, accepting only the `{message, details}` shape.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(message: &str, details: Option<&str>) -> ErrorResponse {
        ErrorResponse {
            message: message.to_string(),
            details: details.map(str::to_string),
        }
    }

    #[test]
    fn test_error_response_display() {
        assert_eq!(response("Invoice not found", None).to_string(), "Invoice not found");
        assert_eq!(
            response("Validation failed", Some("amount must be positive")).to_string(),
            "Validation failed: amount must be positive"
        );
    }

    #[test]
    fn test_parse_accepts_server_shape() {
        let parsed = ErrorResponse::parse(r#"{"message":"Forbidden"}"#).expect("parse");
        assert_eq!(parsed, response("Forbidden", None));
    }

    #[test]
    fn test_parse_rejects_other_bodies() {
        assert!(ErrorResponse::parse("<html>502 Bad Gateway</html>").is_none());
        assert!(ErrorResponse::parse(r#"{"error":"nope"}"#).is_none());
    }
}
