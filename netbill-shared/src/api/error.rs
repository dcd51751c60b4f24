use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::session::SessionUnavailable;

/// Result type alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures surfaced by [`super::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session store could not be read; no request was sent.
    #[error(transparent)]
    SessionUnavailable(#[from] SessionUnavailable),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the credentials. The session has already been
    /// cleared and the login redirect issued.
    #[error("session is no longer valid ({status})")]
    Unauthorized {
        status: StatusCode,
        body: Option<ErrorResponse>,
    },

    /// Any other non-success status, passed through untouched.
    #[error("server responded with {status}{}", .body.as_ref().map(|body| format!(": {body}")).unwrap_or_default())]
    Status {
        status: StatusCode,
        body: Option<ErrorResponse>,
    },

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::SessionUnavailable(_) | Self::Decode(_) => None,
        }
    }

    /// Whether this error ended the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message suitable for showing to an operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { .. } => "Your session has expired. Please sign in again.".to_string(),
            Self::Status {
                body: Some(body), ..
            } => body.message.clone(),
            Self::Status { status, .. } => format!("Request failed: {status}"),
            Self::Transport(_) => "Unable to connect to server".to_string(),
            Self::SessionUnavailable(_) | Self::Decode(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_includes_body() {
        let error = ApiError::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: Some(ErrorResponse {
                message: "amount must be positive".to_string(),
                details: None,
            }),
        };
        assert_eq!(
            error.to_string(),
            "server responded with 422 Unprocessable Entity: amount must be positive"
        );
        assert_eq!(error.user_message(), "amount must be positive");
        assert_eq!(error.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn test_status_error_display_without_body() {
        let error = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: None,
        };
        assert_eq!(error.to_string(), "server responded with 403 Forbidden");
        assert!(!error.is_unauthorized());
    }

    #[test]
    fn test_unauthorized_message() {
        let error = ApiError::Unauthorized {
            status: StatusCode::UNAUTHORIZED,
            body: None,
        };
        assert!(error.is_unauthorized());
        assert!(error.user_message().contains("sign in again"));
    }

    #[test]
    fn test_session_unavailable_has_no_status() {
        let error = ApiError::from(SessionUnavailable);
        assert_eq!(error.status(), None);
    }
}
