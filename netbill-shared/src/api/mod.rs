//! # API client
//!
//! Every call to the billing server goes through [`ApiClient`]. Outgoing
//! requests get the JSON headers and the session's bearer token; a `401`
//! response signs the session out and asks the [`Navigator`] for a hard
//! redirect to the login page before the error reaches the caller.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod interceptor;
pub mod navigation;


pub use client::ApiClient;
pub use endpoints::Resource;
pub use error::{ApiError, ApiResult};
pub use interceptor::{Interception, bearer_value, intercept_status};
pub use navigation::{Navigation, Navigator, RecordingNavigator};
