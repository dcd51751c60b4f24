use std::rc::Rc;

use once_cell::unsync::OnceCell;
use shared::access::AccessGuard;
use shared::api::{ApiClient, Navigation, Navigator};
use shared::config::ClientConfig;
use shared::session::{SessionStore, StoreOptions};

use crate::storage::BrowserStorage;

thread_local! {
    static SHARED_CLIENT: OnceCell<ApiClient> = const { OnceCell::new() };
}

/// Navigates the browser window. Hard navigations reload the page, dropping
/// all in-memory state.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, navigation: &Navigation) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let result = match navigation {
            Navigation::Hard(path) => location.set_href(path),
            Navigation::Replace(path) => location.replace(path),
        };
        if let Err(err) = result {
            web_sys::console::error_2(&"navigation failed".into(), &err);
        }
    }
}

fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

fn build_client() -> ApiClient {
    let mut config = ClientConfig::with_defaults();
    match page_origin() {
        Some(origin) => {
            if let Err(err) = config.api.resolve_origin(&origin) {
                web_sys::console::error_1(&format!("invalid page origin {origin}: {err}").into());
            }
        }
        None => web_sys::console::error_1(&"page origin unavailable".into()),
    }
    let store = SessionStore::open(BrowserStorage, StoreOptions::from(&config.session));
    ApiClient::from_config(&config, store, Rc::new(BrowserNavigator))
}

/// The page-wide API client, created on first use.
pub fn shared_client() -> ApiClient {
    SHARED_CLIENT.with(|cell| cell.get_or_init(build_client).clone())
}

/// The page-wide session store, rehydrated from `localStorage` on first use.
pub fn shared_store() -> SessionStore {
    shared_client().store().clone()
}

/// Guard configured with the default superuser sentinel.
pub fn access_guard() -> AccessGuard {
    AccessGuard::from(&ClientConfig::with_defaults().access)
}
