use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[cfg(not(target_arch = "wasm32"))]
use std::{env, fs, path::Path};

use crate::models::DEFAULT_ROLE;

/// Path prefix shared by every API route.
pub const DEFAULT_BASE_PATH: &str = "/api";
/// Durable storage key holding the persisted session.
pub const DEFAULT_SESSION_KEY: &str = "netbill-auth";
/// Role name that bypasses every permission check.
pub const DEFAULT_SUPERUSER_ROLE: &str = "superuser";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors raised while loading or validating [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be decoded.
    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: String, message: String },

    /// The file extension is not one of `toml`, `yaml`, `yml`, `json`.
    #[error("unsupported configuration format for {path}; use toml, yaml or json")]
    UnsupportedFormat { path: String },

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidEnv { name: String, message: String },

    /// The resolved configuration failed validation.
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Where API calls go.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Server origin. Browser builds leave this unset and fill it from the
    /// page origin through [`ApiConfig::resolve_origin`].
    pub origin: Option<Url>,
    /// Path prefix for every API route.
    pub base_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            origin: None,
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

impl ApiConfig {
    /// Use `page_origin` (e.g. `window.location.origin`) when no origin is
    /// configured. A configured origin is kept.
    ///
    /// # Errors
    /// Returns the parse error when `page_origin` is not an absolute URL.
    pub fn resolve_origin(&mut self, page_origin: &str) -> Result<(), url::ParseError> {
        if self.origin.is_none() {
            self.origin = Some(Url::parse(page_origin)?);
        }
        Ok(())
    }

    /// Origin and base path joined, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        let origin = self
            .origin
            .as_ref()
            .map_or("", |origin| origin.as_str().trim_end_matches('/'));
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{path}")
        }
    }
}

/// Session persistence and normalization settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Durable storage key for the persisted session.
    pub storage_key: String,
    /// Role assigned when the server sends neither `role` nor `roles`.
    pub default_role: String,
    /// Whether `set_auth` with a null user still marks the session authenticated.
    pub null_user_is_authenticated: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_SESSION_KEY.to_string(),
            default_role: DEFAULT_ROLE.to_string(),
            null_user_is_authenticated: true,
        }
    }
}

/// Access guard settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AccessConfig {
    /// Role that bypasses permission checks, compared case-insensitively.
    pub superuser_role: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            superuser_role: DEFAULT_SUPERUSER_ROLE.to_string(),
        }
    }
}

/// Configuration for a NetBill client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// API location.
    pub api: ApiConfig,
    /// Session store settings.
    pub session: SessionConfig,
    /// Access guard settings.
    pub access: AccessConfig,
    /// Logging level for native clients.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            access: AccessConfig::default(),
            log_level: "info".to_string(),
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// Files are decoded by extension (`toml`, `yaml`/`yml`, `json`). An
    /// environment variable only applies to a value the file left at its
    /// default.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed, an
    /// environment override is malformed, or validation fails.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_config(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::with_defaults(),
        };
        config.apply_env_overrides()?;

        if let Err(errors) = config.validate() {
            return Err(ConfigError::Invalid(errors));
        }
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: display.clone(),
            message,
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|err| parse_error(err.to_string())),
            Some("yaml" | "yml") => {
                serde_yml::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            _ => Err(ConfigError::UnsupportedFormat {
                path: display.clone(),
            }),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let defaults = Self::with_defaults();

        if self.api.origin.is_none() {
            if let Ok(origin) = env::var("NETBILL_API_ORIGIN") {
                let parsed = Url::parse(&origin).map_err(|err| ConfigError::InvalidEnv {
                    name: "NETBILL_API_ORIGIN".to_string(),
                    message: err.to_string(),
                })?;
                self.api.origin = Some(parsed);
            }
        }
        if self.log_level == defaults.log_level {
            if let Ok(level) = env::var("NETBILL_LOG_LEVEL") {
                self.log_level = level.to_lowercase();
            }
        }
        if self.session.storage_key == defaults.session.storage_key {
            if let Ok(key) = env::var("NETBILL_SESSION_KEY") {
                self.session.storage_key = key;
            }
        }
        if self.access.superuser_role == defaults.access.superuser_role {
            if let Ok(role) = env::var("NETBILL_SUPERUSER_ROLE") {
                self.access.superuser_role = role;
            }
        }
        Ok(())
    }

    /// Validate the resolved configuration.
    ///
    /// # Errors
    /// Returns every problem found, one message per entry.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.api.base_path.starts_with('/') {
            errors.push(format!(
                "api.base_path must start with '/': {}",
                self.api.base_path
            ));
        }
        if let Some(origin) = &self.api.origin {
            if !matches!(origin.scheme(), "http" | "https") {
                errors.push(format!("api.origin must be http or https: {origin}"));
            }
        }
        if self.session.storage_key.trim().is_empty() {
            errors.push("session.storage_key must not be empty".to_string());
        }
        if self.access.superuser_role.trim().is_empty() {
            errors.push("access.superuser_role must not be empty".to_string());
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {}: {}",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn cleanup_env_vars() {
        unsafe {
            std::env::remove_var("NETBILL_API_ORIGIN");
            std::env::remove_var("NETBILL_LOG_LEVEL");
            std::env::remove_var("NETBILL_SESSION_KEY");
            std::env::remove_var("NETBILL_SUPERUSER_ROLE");
        }
    }

    #[test]
    fn test_config_with_defaults() {
        let config = ClientConfig::with_defaults();

        assert_eq!(config.api.base_path, "/api");
        assert_eq!(config.api.origin, None);
        assert_eq!(config.session.storage_key, "netbill-auth");
        assert_eq!(config.session.default_role, "User");
        assert!(config.session.null_user_is_authenticated);
        assert_eq!(config.access.superuser_role, "superuser");
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_without_origin_is_relative() {
        assert_eq!(ApiConfig::default().base_url(), "/api");
    }

    #[test]
    fn test_base_url_with_origin() {
        let api = ApiConfig {
            origin: Some(Url::parse("https://billing.isp.test/").expect("url")),
            base_path: "/api/".to_string(),
        };
        assert_eq!(api.base_url(), "https://billing.isp.test/api");
    }

    #[test]
    fn test_resolve_origin_fills_missing_origin() {
        let mut api = ApiConfig::default();
        api.resolve_origin("https://billing.isp.test").expect("page origin");
        assert_eq!(api.base_url(), "https://billing.isp.test/api");

        let mut configured = ApiConfig {
            origin: Some(Url::parse("https://api.isp.test").expect("url")),
            ..ApiConfig::default()
        };
        configured.resolve_origin("https://billing.isp.test").expect("page origin");
        assert_eq!(configured.base_url(), "https://api.isp.test/api");

        assert!(ApiConfig::default().resolve_origin("null").is_err());
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        cleanup_env_vars();
        let config = ClientConfig::load_config(None).expect("load");
        assert_eq!(config, ClientConfig::with_defaults());
    }

    #[test]
    #[serial]
    fn test_load_config_from_toml_keeps_unset_defaults() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("netbill.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\n[api]\norigin = \"http://localhost:8080\"\n",
        )
        .expect("write");

        let config = ClientConfig::load_config(Some(&path)).expect("load");

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api.base_url(), "http://localhost:8080/api");
        assert_eq!(config.session.storage_key, "netbill-auth");
    }

    #[test]
    #[serial]
    fn test_load_config_from_yaml() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("netbill.yaml");
        fs::write(&path, "access:\n  superuser_role: root\n").expect("write");

        let config = ClientConfig::load_config(Some(&path)).expect("load");

        assert_eq!(config.access.superuser_role, "root");
    }

    #[test]
    #[serial]
    fn test_load_config_from_json() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("netbill.json");
        fs::write(
            &path,
            r#"{"session": {"null_user_is_authenticated": false}}"#,
        )
        .expect("write");

        let config = ClientConfig::load_config(Some(&path)).expect("load");

        assert!(!config.session.null_user_is_authenticated);
    }

    #[test]
    #[serial]
    fn test_load_config_rejects_unknown_extension() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("netbill.ini");
        fs::write(&path, "log_level=debug").expect("write");

        let result = ClientConfig::load_config(Some(&path));

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file() {
        cleanup_env_vars();
        let result = ClientConfig::load_config(Some(Path::new("/nonexistent/netbill.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    #[serial]
    fn test_load_config_with_environment_variables() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var("NETBILL_API_ORIGIN", "http://127.0.0.1:9000");
            std::env::set_var("NETBILL_LOG_LEVEL", "WARN");
            std::env::set_var("NETBILL_SESSION_KEY", "netbill-auth-staging");
            std::env::set_var("NETBILL_SUPERUSER_ROLE", "root");
        }

        let config = ClientConfig::load_config(None).expect("load");

        assert_eq!(config.api.base_url(), "http://127.0.0.1:9000/api");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.session.storage_key, "netbill-auth-staging");
        assert_eq!(config.access.superuser_role, "root");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_file_values_win_over_environment() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("netbill.toml");
        fs::write(&path, "log_level = \"error\"\n").expect("write");
        unsafe {
            std::env::set_var("NETBILL_LOG_LEVEL", "debug");
        }

        let config = ClientConfig::load_config(Some(&path)).expect("load");

        assert_eq!(config.log_level, "error");
        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_origin_env_is_reported() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var("NETBILL_API_ORIGIN", "not a url");
        }

        let result = ClientConfig::load_config(None);

        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
        cleanup_env_vars();
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = ClientConfig::with_defaults();
        config.api.base_path = "api".to_string();
        config.session.storage_key = "  ".to_string();
        config.log_level = "verbose".to_string();

        let errors = config.validate().expect_err("invalid");

        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("base_path"));
    }
}
