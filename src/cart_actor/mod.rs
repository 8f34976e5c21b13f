//! The cart engine: a single-owner actor holding the authoritative cart.

mod lane;
mod service;

pub use service::CartService;
