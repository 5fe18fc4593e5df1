use super::{KeyValueStore, StorageError};

/// Browser LocalStorage
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable {
                message: "no window".to_string(),
            })?
            .local_storage()
            .map_err(|e| StorageError::Unavailable {
                message: format!("{e:?}"),
            })?
            .ok_or_else(|| StorageError::Unavailable {
                message: "localStorage disabled".to_string(),
            })?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::ReadFailed {
                key: key.to_string(),
                message: format!("{e:?}"),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                message: format!("{e:?}"),
            })
    }
}
