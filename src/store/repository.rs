use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::KeyValueStore;
use crate::domain::{Cart, Product};
use crate::error::StoreError;

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    items: &'a [Product],
}

// A bare array is the unversioned layout written before the envelope existed.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Versioned { version: u32, items: Vec<Product> },
    Legacy(Vec<Product>),
}

/// Loads and saves the whole cart under one key. Never writes a delta.
pub struct CartRepository {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl CartRepository {
    pub fn new(store: impl KeyValueStore, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the last snapshot. An absent or empty value is an empty cart.
    #[instrument(fields(key = %self.key), skip(self))]
    pub fn load(&self) -> Result<Cart, StoreError> {
        match self.store.get(&self.key)? {
            Some(bytes) if !bytes.is_empty() => {
                let cart = self.decode(&bytes)?;
                info!(items = cart.len(), "Loaded cart snapshot");
                Ok(cart)
            }
            _ => {
                debug!("No stored cart, starting empty");
                Ok(Cart::new())
            }
        }
    }

    /// Overwrites the stored snapshot with `cart`.
    #[instrument(fields(key = %self.key, items = cart.len()), skip(self, cart))]
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let bytes = Self::encode(cart)?;
        self.store.set(&self.key, bytes)?;
        debug!("Saved cart snapshot");
        Ok(())
    }

    pub fn encode(cart: &Cart) -> Result<Vec<u8>, StoreError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            items: cart.items(),
        };
        serde_json::to_vec(&snapshot).map_err(|e| StoreError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Cart, StoreError> {
        let snapshot: StoredSnapshot =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
                key: self.key.clone(),
                reason: e.to_string(),
            })?;

        match snapshot {
            StoredSnapshot::Versioned { version, items } if version == SNAPSHOT_VERSION => {
                Ok(Cart::from_items(items))
            }
            StoredSnapshot::Versioned { version, .. } => {
                Err(StoreError::UnsupportedVersion(version))
            }
            StoredSnapshot::Legacy(items) => {
                info!(items = items.len(), "Migrating unversioned cart snapshot");
                Ok(Cart::from_items(items))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, CART_KEY};

    fn shoe(id: u64, amount: u32) -> Product {
        Product {
            id,
            title: "Shoe".to_string(),
            price: 100.0,
            image_url: "shoe.png".to_string(),
            amount,
        }
    }

    #[test]
    fn test_load_missing_or_empty_value_is_empty_cart() {
        let store = MemoryStore::new();
        let repository = CartRepository::new(store.clone(), CART_KEY);
        assert!(repository.load().unwrap().is_empty());

        store.set(CART_KEY, Vec::new()).unwrap();
        assert!(repository.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_returns_equal_cart() {
        let store = MemoryStore::new();
        let repository = CartRepository::new(store.clone(), CART_KEY);
        let cart = Cart::from_items(vec![shoe(1, 2), shoe(2, 1)]);

        repository.save(&cart).unwrap();

        assert_eq!(repository.load().unwrap(), cart);
        let raw: serde_json::Value =
            serde_json::from_slice(&store.get(CART_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["items"][0]["image"], "shoe.png");
    }

    #[test]
    fn test_legacy_array_snapshot_is_migrated() {
        let store = MemoryStore::new();
        let legacy = r#"[{"id":1,"title":"Shoe","price":100,"image":"shoe.png","amount":3}]"#;
        store.set(CART_KEY, legacy.as_bytes().to_vec()).unwrap();

        let cart = CartRepository::new(store, CART_KEY).load().unwrap();
        assert_eq!(cart.amount_of(1), Some(3));

        let store = MemoryStore::new();
        store.set(CART_KEY, b"[]".to_vec()).unwrap();
        assert!(CartRepository::new(store, CART_KEY).load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_and_future_snapshots_are_rejected() {
        let store = MemoryStore::new();
        store.set(CART_KEY, b"{not json".to_vec()).unwrap();
        let err = CartRepository::new(store, CART_KEY).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        let store = MemoryStore::new();
        store
            .set(CART_KEY, br#"{"version":7,"items":[]}"#.to_vec())
            .unwrap();
        let err = CartRepository::new(store, CART_KEY).load().unwrap_err();
        assert_eq!(err, StoreError::UnsupportedVersion(7));
    }
}
