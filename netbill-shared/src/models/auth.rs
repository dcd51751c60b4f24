use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials posted to `auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Email address or username.
    pub email: String,
    /// Plain-text password, sent over TLS only.
    pub password: String,
}

/// Account details posted to `auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name for the new account.
    pub name: String,
    /// Email address used to sign in.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Confirmation of `password`, checked by the server.
    pub password_confirmation: String,
}

/// Body returned by both `auth/login` and `auth/register`.
///
/// `user` is kept as raw JSON: the server may send `null`, and arbitrary
/// profile fields must reach the session store untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// The authenticated user record.
    #[serde(default)]
    pub user: Value,
    /// Bearer token for subsequent calls.
    #[serde(default)]
    pub token: Option<String>,
}
