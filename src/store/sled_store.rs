use std::path::Path;

use super::KeyValueStore;
use crate::error::StoreError;

/// Sled-backed durable store. Every write is flushed before returning.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Opens (or creates) the database at `path`, creating the parent directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| StoreError::Backend(format!("Failed to open Sled database: {}", e)))?;

        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to read {}: {}", key, e)))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| StoreError::Backend(format!("Failed to write {}: {}", key, e)))?;

        self.db
            .flush()
            .map_err(|e| StoreError::Backend(format!("Failed to flush database: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sled_store_overwrites_whole_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("cart.sled");

        let store = SledStore::open(&db_path).unwrap();
        assert_eq!(store.get("cart").unwrap(), None);

        store.set("cart", b"[1,2,3]".to_vec()).unwrap();
        store.set("cart", b"[]".to_vec()).unwrap();

        assert_eq!(store.get("cart").unwrap(), Some(b"[]".to_vec()));
        assert!(db_path.parent().unwrap().exists());
    }
}
