use std::{cell::RefCell, collections::HashMap, rc::Rc};

#[cfg(not(target_arch = "wasm32"))]
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Failures reported by a [`SessionStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be reached at all (no `localStorage`, no config dir).
    #[error("session storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing a file failed.
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Durable key/value storage for the persisted session.
pub trait SessionStorage {
    /// Read the raw value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same entries, which lets tests
/// reopen a store over the "same disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value under `key`, for inspection.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory, readable only by the owner.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    /// Store session files under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config dir>/netbill`, when the platform exposes a config directory.
    #[must_use]
    pub fn in_config_dir() -> Option<Self> {
        directories::BaseDirs::new().map(|dirs| Self::new(dirs.config_dir().join("netbill")))
    }

    /// Directory holding the session files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Path separators in the key are flattened.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error(&path, err)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|err| Self::io_error(&self.dir, err))?;
        let path = self.path_for(key);
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&path)
            .map_err(|err| Self::io_error(&path, err))?;
        // `mode` only applies on creation; tighten files left by older builds.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|err| Self::io_error(&path, err))?;
        }
        file.write_all(value.as_bytes())
            .map_err(|err| Self::io_error(&path, err))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(&path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let reopened = storage.clone();

        storage.save("netbill-auth", "{}").expect("save");

        assert_eq!(reopened.load("netbill-auth").expect("load").as_deref(), Some("{}"));
        reopened.remove("netbill-auth").expect("remove");
        assert_eq!(storage.raw("netbill-auth"), None);
    }

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let temp_dir = TempDir::new().expect("temp dir");
        let storage = FileStorage::new(temp_dir.path().join("netbill"));
        assert_eq!(storage.load("netbill-auth").expect("load"), None);
        storage.remove("netbill-auth").expect("removing a missing key");
    }

    #[test]
    fn test_file_storage_creates_directory_and_persists() {
        let temp_dir = TempDir::new().expect("temp dir");
        let storage = FileStorage::new(temp_dir.path().join("nested").join("netbill"));

        storage.save("netbill-auth", r#"{"version":0}"#).expect("save");

        let reopened = FileStorage::new(storage.dir().to_path_buf());
        assert_eq!(
            reopened.load("netbill-auth").expect("load").as_deref(),
            Some(r#"{"version":0}"#)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("temp dir");
        let storage = FileStorage::new(temp_dir.path());
        storage.save("netbill-auth", "{}").expect("save");

        let mode = fs::metadata(storage.path_for("netbill-auth"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("temp dir");
        let storage = FileStorage::new(temp_dir.path());
        let path = storage.path_for("netbill-auth");
        fs::write(&path, r#"{"state":{"token":"old-token-with-a-long-tail"}}"#).expect("seed");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        storage.save("netbill-auth", "{}").expect("save");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).expect("read"), "{}");
    }

    #[test]
    fn test_file_storage_flattens_separators() {
        let storage = FileStorage::new("/tmp/netbill");
        assert_eq!(
            storage.path_for("tenant/auth"),
            PathBuf::from("/tmp/netbill/tenant_auth.json")
        );
    }
}
