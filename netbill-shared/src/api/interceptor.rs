//! Request decoration and response classification, free of any I/O so both
//! halves can be checked without a server.

use reqwest::{
    StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};

use super::navigation::Navigation;
use crate::access::LOGIN_PATH;

const JSON: &str = "application/json";

/// What the client must do with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Hand the response (or its error) to the caller unchanged.
    PassThrough,
    /// Sign out, perform `redirect`, then hand the error to the caller.
    SessionInvalidated { redirect: Navigation },
}

/// Classify a response status.
#[must_use]
pub fn intercept_status(status: StatusCode) -> Interception {
    if status == StatusCode::UNAUTHORIZED {
        Interception::SessionInvalidated {
            redirect: Navigation::Hard(LOGIN_PATH.to_string()),
        }
    } else {
        Interception::PassThrough
    }
}

/// Headers sent with every request.
#[must_use]
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON));
    headers
}

/// `Authorization` value for `token`, or `None` when there is no token or it
/// cannot be carried in a header.
#[must_use]
pub fn bearer_value(token: Option<&str>) -> Option<HeaderValue> {
    let token = token?;
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).ok()?;
    value.set_sensitive(true);
    Some(value)
}
