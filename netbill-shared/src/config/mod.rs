//! # Configuration
//!
//! Settings shared by the web and command-line clients. Browser builds use
//! [`ClientConfig::with_defaults`]; native builds may also load a file and
//! environment overrides through `ClientConfig::load_config`.

pub mod client;

pub use client::{
    AccessConfig, ApiConfig, ClientConfig, ConfigError, DEFAULT_BASE_PATH, DEFAULT_SESSION_KEY,
    DEFAULT_SUPERUSER_ROLE, SessionConfig,
};
