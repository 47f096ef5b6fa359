//! Cart aggregate: a user's pending selections.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's working set before commit. Purely bookkeeping: stock is checked
/// against the catalog at read time, never stored here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merges into an existing line or appends a new one. A zero quantity is
    /// a no-op; the cart never holds a zero-quantity row.
    pub fn add_item(&mut self, product_id: Uuid, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { product_id, quantity }),
        }
    }

    /// Overwrites a line's quantity; zero removes the line. Returns `false`
    /// when the line does not exist.
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: u32) -> bool {
        let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return false;
        };
        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            line.quantity = quantity;
        }
        true
    }

    pub fn remove_item(&mut self, product_id: Uuid) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
