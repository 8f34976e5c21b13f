use serde::{Deserialize, Serialize};

use super::ProductId;

/// Available inventory for a product, as served by `GET /stock/{id}`.
///
/// Read-only from the cart's point of view and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

impl Stock {
    pub fn new(id: ProductId, amount: u32) -> Self {
        Self { id, amount }
    }

    /// Whether `requested` units can be taken from this stock level.
    pub fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}
