pub mod auth;
pub mod errors;
pub mod user;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use errors::ErrorResponse;
pub use user::{DEFAULT_ROLE, SessionUser};
