use gloo_storage::{LocalStorage, Storage, errors::StorageError as GlooError};
use serde_json::Value;
use shared::session::{SessionStorage, StorageError};

/// Session storage backed by the browser's `localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

fn unavailable(err: &GlooError) -> StorageError {
    StorageError::Unavailable(err.to_string())
}

impl SessionStorage for BrowserStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match LocalStorage::get::<Value>(key) {
            Ok(value) => Ok(Some(value.to_string())),
            Err(GlooError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(unavailable(&err)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let document: Value = serde_json::from_str(value)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        LocalStorage::set(key, document).map_err(|err| unavailable(&err))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        LocalStorage::delete(key);
        Ok(())
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use shared::session::{SessionStore, StoreOptions};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_browser_storage_round_trip() {
        let key = "netbill-auth-browser-test";
        BrowserStorage.remove(key).expect("remove");
        assert_eq!(BrowserStorage.load(key).expect("load"), None);

        BrowserStorage.save(key, r#"{"version":0}"#).expect("save");
        assert_eq!(
            BrowserStorage.load(key).expect("load").as_deref(),
            Some(r#"{"version":0}"#)
        );
        BrowserStorage.remove(key).expect("remove");
    }

    #[wasm_bindgen_test]
    fn test_session_survives_reload() {
        let options = StoreOptions {
            storage_key: "netbill-auth-reload-test".to_string(),
            ..StoreOptions::default()
        };
        let store = SessionStore::open(BrowserStorage, options.clone());
        store.set_auth(None, Some("abc".to_string()));

        let reloaded = SessionStore::open(BrowserStorage, options.clone());
        assert_eq!(reloaded.snapshot(), store.snapshot());

        store.logout();
        BrowserStorage.remove(&options.storage_key).expect("remove");
    }
}
