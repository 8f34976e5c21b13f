//! Persistence adapter: opaque byte storage plus the cart snapshot codec.

pub mod memory;
pub mod repository;
pub mod sled_store;

pub use memory::MemoryStore;
pub use repository::{CartRepository, SNAPSHOT_VERSION};
pub use sled_store::SledStore;

use crate::error::StoreError;

/// Fixed namespace key the cart snapshot lives under.
pub const CART_KEY: &str = "@RocketShoes:cart";

/// A durable key-value byte store. Reads and writes are whole values.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}
