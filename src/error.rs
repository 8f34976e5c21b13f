use std::fmt;

use thiserror::Error;

use crate::domain::ProductId;

/// The cart mutation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// User-facing message for a failed operation of this kind.
    pub fn failure_message(self) -> &'static str {
        match self {
            CartOperation::Add => "could not add product",
            CartOperation::Remove => "could not remove product",
            CartOperation::UpdateAmount => "could not update quantity",
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartOperation::Add => write!(f, "add_product"),
            CartOperation::Remove => write!(f, "remove_product"),
            CartOperation::UpdateAmount => write!(f, "update_product_amount"),
        }
    }
}

/// Outcome of a failed cart operation. `Display` yields the message shown to the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("{}", .operation.failure_message())]
    ServiceFailure {
        operation: CartOperation,
        product_id: ProductId,
        reason: String,
    },
    #[error("{}", .operation.failure_message())]
    NotInCart {
        operation: CartOperation,
        product_id: ProductId,
    },
    #[error("requested quantity exceeds available stock")]
    StockExceeded {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
    #[error("{}", .operation.failure_message())]
    Superseded {
        operation: CartOperation,
        product_id: ProductId,
    },
    #[error("could not save cart")]
    Persistence {
        operation: CartOperation,
        product_id: ProductId,
        reason: String,
    },
    #[error("cart service unavailable: {0}")]
    ActorCommunicationError(String),
}

impl CartError {
    pub fn operation(&self) -> Option<CartOperation> {
        match self {
            CartError::ServiceFailure { operation, .. }
            | CartError::NotInCart { operation, .. }
            | CartError::Superseded { operation, .. }
            | CartError::Persistence { operation, .. } => Some(*operation),
            CartError::StockExceeded { .. } => Some(CartOperation::UpdateAmount),
            CartError::ActorCommunicationError(_) => None,
        }
    }

    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            CartError::ServiceFailure { product_id, .. }
            | CartError::NotInCart { product_id, .. }
            | CartError::StockExceeded { product_id, .. }
            | CartError::Superseded { product_id, .. }
            | CartError::Persistence { product_id, .. } => Some(*product_id),
            CartError::ActorCommunicationError(_) => None,
        }
    }
}

/// Failures talking to the catalog/stock service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Catalog transport error: {0}")]
    Transport(String),
    #[error("Catalog returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Catalog response could not be decoded: {0}")]
    Decode(String),
}

/// Failures of the key-value store or of the snapshot codec.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("Corrupt snapshot under {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
    #[error("Snapshot encoding error: {0}")]
    Encode(String),
}

/// Failures while bringing the cart system up.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
