use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::PortalError;

/// Key/value string storage with the shape of the browser's `localStorage`.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PortalError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PortalError>;
    fn remove_item(&self, key: &str) -> Result<(), PortalError>;
}

/// In-process storage, for tests and headless callers.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PortalError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PortalError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), PortalError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::file::JsonFileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::BTreeMap;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use tempfile::NamedTempFile;
    use tracing::{info, warn};

    use super::SessionStorage;
    use crate::error::PortalError;

    /// File name used under the platform data directory.
    const DEFAULT_FILE_NAME: &str = "university-portal/storage.json";

    /// Storage backed by a single JSON object file of key -> string value.
    ///
    /// Every write replaces the whole file: the new content goes to a temp
    /// file in the same directory which is then renamed over the target.
    #[derive(Debug, Clone)]
    pub struct JsonFileStorage {
        path: PathBuf,
    }

    impl JsonFileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// Storage file under the user's data directory, if one exists.
        pub fn in_data_dir() -> Option<Self> {
            dirs::data_dir().map(|dir| Self::new(dir.join(DEFAULT_FILE_NAME)))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_all(&self) -> Result<BTreeMap<String, String>, PortalError> {
            let content = match std::fs::read_to_string(&self.path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(BTreeMap::new());
                }
                Err(e) => {
                    return Err(PortalError::Storage(format!(
                        "Failed to read {:?}: {}",
                        self.path, e
                    )))
                }
            };

            match serde_json::from_str(&content) {
                Ok(items) => Ok(items),
                Err(e) => {
                    warn!("Storage file {:?} is corrupt, starting empty: {}", self.path, e);
                    Ok(BTreeMap::new())
                }
            }
        }

        fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), PortalError> {
            let json = serde_json::to_string_pretty(items)
                .map_err(|e| PortalError::Storage(format!("Failed to serialize storage: {}", e)))?;

            let parent = self.path.parent().ok_or_else(|| {
                PortalError::Storage(format!("Storage path has no parent: {:?}", self.path))
            })?;
            std::fs::create_dir_all(parent)
                .map_err(|e| PortalError::Storage(format!("Failed to create {:?}: {}", parent, e)))?;

            let mut temp = NamedTempFile::new_in(parent)
                .map_err(|e| PortalError::Storage(format!("Failed to create temp file: {}", e)))?;
            temp.write_all(json.as_bytes())
                .and_then(|_| temp.flush())
                .map_err(|e| PortalError::Storage(format!("Failed to write temp file: {}", e)))?;
            temp.persist(&self.path)
                .map_err(|e| PortalError::Storage(format!("Failed to replace {:?}: {}", self.path, e)))?;

            info!("Wrote {} storage entries to {:?}", items.len(), self.path);
            Ok(())
        }
    }

    impl SessionStorage for JsonFileStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, PortalError> {
            Ok(self.read_all()?.remove(key))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), PortalError> {
            let mut items = self.read_all()?;
            items.insert(key.to_string(), value.to_string());
            self.write_all(&items)
        }

        fn remove_item(&self, key: &str) -> Result<(), PortalError> {
            let mut items = self.read_all()?;
            if items.remove(key).is_some() {
                self.write_all(&items)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get_item("k").unwrap().is_none());

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);

        storage.remove_item("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        JsonFileStorage::new(&path).set_item("authState", "{}").unwrap();
        JsonFileStorage::new(&path).set_item("other", "x").unwrap();

        let reopened = JsonFileStorage::new(&path);
        assert_eq!(reopened.get_item("authState").unwrap().as_deref(), Some("{}"));
        assert_eq!(reopened.get_item("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_storage_remove_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("storage.json"));
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();

        storage.remove_item("a").unwrap();
        storage.remove_item("missing").unwrap();

        assert!(storage.get_item("a").unwrap().is_none());
        assert_eq!(storage.get_item("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("absent.json"));
        assert!(storage.get_item("authState").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_corrupt_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = JsonFileStorage::new(&path);
        assert!(storage.get_item("authState").unwrap().is_none());
        storage.set_item("authState", "{}").unwrap();
        assert_eq!(storage.get_item("authState").unwrap().as_deref(), Some("{}"));
    }
}
