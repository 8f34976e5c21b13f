//! # cart-engine
//!
//! Client-side shopping cart. Holds an ordered, id-unique list of line items,
//! checks quantity changes against a remote stock service and persists the
//! whole cart after every successful change.
//!
//! The cart is owned by a single actor ([`CartService`]); callers talk to it
//! through a cloneable [`CartClient`]. [`CartSystem`] wires the actor to a
//! catalog, a store and a failure sink.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use cart_engine::{CartConfig, CartSystem};
//!
//! let system = CartSystem::from_config(&CartConfig::from_env())?;
//! system.cart_client.add_product(1).await?;
//! system.cart_client.update_product_amount(1, 3).await?;
//! println!("{} units in cart", system.cart_client.cart().total_units());
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod cart_actor;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod messages;
pub mod notify;
pub mod store;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, CartSystem};
pub use cart_actor::CartService;
pub use clients::CartClient;
pub use config::CartConfig;
pub use domain::{Cart, CatalogProduct, Product, ProductId, Stock};
pub use error::{CartError, CartOperation, CatalogError, StoreError, SystemError};
