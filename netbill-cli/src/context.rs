//! Everything a command needs: resolved configuration, the file-backed
//! session store, and an API client wired to both.

use std::{
    env,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context as _, Result, bail};
use shared::access::{AccessGuard, LOGIN_PATH};
use shared::api::{ApiClient, Navigation, Navigator};
use shared::config::ClientConfig;
use shared::session::{FileStorage, SessionStore, StoreOptions};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// Overrides the directory holding session files.
pub const SESSION_DIR_ENV: &str = "NETBILL_SESSION_DIR";

/// Prints navigation requests as notices on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, navigation: &Navigation) {
        if navigation.path() == LOGIN_PATH {
            eprintln!("Session expired. Run `netbill session login` to sign in again.");
        } else {
            eprintln!("Redirected to {}", navigation.path());
        }
    }
}

#[derive(Debug)]
pub struct AppContext {
    pub config: ClientConfig,
    pub store: SessionStore,
    pub guard: AccessGuard,
    pub session_file: PathBuf,
}

impl AppContext {
    /// Resolve configuration, install logging and open the session store.
    pub fn load(config_path: Option<&Path>, origin: Option<Url>) -> Result<Self> {
        let mut config = ClientConfig::load_config(config_path)
            .context("failed to load configuration")?;
        if origin.is_some() {
            config.api.origin = origin;
        }
        initialize_tracing(&config);

        let storage = session_storage()?;
        let session_file = storage.path_for(&config.session.storage_key);
        let store = SessionStore::open(storage, StoreOptions::from(&config.session));
        let guard = AccessGuard::from(&config.access);

        Ok(Self {
            config,
            store,
            guard,
            session_file,
        })
    }

    /// API client for commands that talk to the server.
    pub fn client(&self) -> Result<ApiClient> {
        if self.config.api.origin.is_none() {
            bail!("no API origin configured; pass --origin or set NETBILL_API_ORIGIN");
        }
        Ok(ApiClient::from_config(
            &self.config,
            self.store.clone(),
            Rc::new(TerminalNavigator),
        ))
    }
}

fn session_storage() -> Result<FileStorage> {
    if let Ok(dir) = env::var(SESSION_DIR_ENV) {
        return Ok(FileStorage::new(dir));
    }
    FileStorage::in_config_dir()
        .context("no configuration directory available; set NETBILL_SESSION_DIR")
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
fn initialize_tracing(config: &ClientConfig) {
    let default_level = config
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy()
    });

    let _ = fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}
