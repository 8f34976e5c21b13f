use std::collections::VecDeque;

use crate::domain::{Cart, CatalogProduct, ProductId, Stock};
use crate::error::{CartError, CartOperation, CatalogError};
use crate::messages::ServiceResponse;

/// An operation as requested by a caller, before it has looked at the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CartOp {
    Add,
    Remove,
    SetAmount(i64),
}

/// What an in-flight operation will do once its lookup resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pending {
    Add,
    SetAmount(u32),
}

impl Pending {
    pub(crate) fn operation(self) -> CartOperation {
        match self {
            Pending::Add => CartOperation::Add,
            Pending::SetAmount(_) => CartOperation::UpdateAmount,
        }
    }
}

/// An operation waiting on a catalog or stock lookup.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub(crate) pending: Pending,
    /// Amount of the line when the lookup was issued, `None` if it was absent.
    pub(crate) expected: Option<u32>,
    pub(crate) respond_to: ServiceResponse<(), CartError>,
}

impl InFlight {
    /// Whether the line still looks the way it did when the lookup was issued.
    pub(crate) fn is_current(&self, cart: &Cart, product_id: ProductId) -> bool {
        cart.amount_of(product_id) == self.expected
    }
}

#[derive(Debug)]
pub(crate) struct Queued {
    pub(crate) op: CartOp,
    pub(crate) respond_to: ServiceResponse<(), CartError>,
}

/// Operations for one product: the in-flight one and those queued behind it.
#[derive(Debug)]
pub(crate) struct ProductLane {
    pub(crate) in_flight: InFlight,
    pub(crate) waiting: VecDeque<Queued>,
}

impl ProductLane {
    pub(crate) fn new(in_flight: InFlight) -> Self {
        Self {
            in_flight,
            waiting: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        1 + self.waiting.len()
    }
}

/// A resolved external lookup, sent back to the service by the task that made it.
#[derive(Debug)]
pub(crate) enum Lookup {
    Product {
        product_id: ProductId,
        result: Result<Option<CatalogProduct>, CatalogError>,
    },
    Stock {
        product_id: ProductId,
        result: Result<Stock, CatalogError>,
    },
}

impl Lookup {
    pub(crate) fn product_id(&self) -> ProductId {
        match self {
            Lookup::Product { product_id, .. } | Lookup::Stock { product_id, .. } => *product_id,
        }
    }
}
