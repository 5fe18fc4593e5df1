//! Key/value persistence boundary
//!
//! Everything the runtime keeps between runs (best scores, settings, tuning,
//! achievement progress) goes through `KeyValueStore`:
//! - `MemoryStore` for tests and native builds
//! - `LocalStorage` in the browser

mod memory;
#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("read failed for {key}: {message}")]
    ReadFailed { key: String, message: String },

    #[error("write failed for {key}: {message}")]
    WriteFailed { key: String, message: String },

    #[error("corrupt value under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<'a> dyn KeyValueStore + 'a {
    /// Read and decode a JSON value
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Encode and write a JSON value
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        let dyn_store: &mut dyn KeyValueStore = &mut store;
        let mut scores = BTreeMap::new();
        scores.insert("breakout".to_string(), 1200u64);
        dyn_store.set_json("scores", &scores).unwrap();

        let back: BTreeMap<String, u64> = dyn_store.get_json("scores").unwrap().unwrap();
        assert_eq!(back, scores);
        assert!(dyn_store.get_json::<u64>("missing").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_json_is_reported() {
        let mut store = MemoryStore::new();
        store.insert_raw("scores", "{{{");
        let dyn_store: &dyn KeyValueStore = &store;
        let err = dyn_store.get_json::<u64>("scores").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
        assert!(err.to_string().contains("scores"));
    }
}
