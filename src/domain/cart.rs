use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Product, ProductId};

/// The ordered, id-unique list of line items.
///
/// A `Cart` is an immutable snapshot: mutations return a new `Cart` and leave
/// the receiver untouched, so a rejected change never leaves a half-applied
/// state behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from stored line items.
    ///
    /// Duplicate ids keep their first occurrence and zero-amount lines are
    /// dropped, so every cart satisfies the uniqueness and `amount >= 1` rules.
    pub fn from_items(items: Vec<Product>) -> Self {
        let mut seen = HashSet::with_capacity(items.len());
        let items = items
            .into_iter()
            .filter(|item| {
                if item.amount == 0 {
                    warn!(product_id = item.id, "Dropping line item with zero amount");
                    return false;
                }
                if !seen.insert(item.id) {
                    warn!(product_id = item.id, "Dropping duplicate line item");
                    return false;
                }
                true
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity of the line for `id`, `None` when absent.
    pub fn amount_of(&self, id: ProductId) -> Option<u32> {
        self.get(id).map(|item| item.amount)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Appends a new line. `None` if the id is already present or the line is empty.
    pub fn with_line(&self, line: Product) -> Option<Cart> {
        if line.amount == 0 || self.contains(line.id) {
            return None;
        }
        let mut items = self.items.clone();
        items.push(line);
        Some(Self { items })
    }

    /// Drops the line for `id`. `None` if absent.
    pub fn without(&self, id: ProductId) -> Option<Cart> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let mut items = self.items.clone();
        items.remove(index);
        Some(Self { items })
    }

    /// Sets the line for `id` to exactly `amount`. `None` if absent or `amount` is zero.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Cart> {
        if amount == 0 {
            return None;
        }
        let mut items = self.items.clone();
        let line = items.iter_mut().find(|item| item.id == id)?;
        line.amount = amount;
        Some(Self { items })
    }
}
