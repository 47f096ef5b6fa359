//! In-process cart storage shared across requests.
//!
//! Carts are a best-effort working set with no persistence guarantee beyond
//! process lifetime; swap this for Redis or a DB-backed store for
//! durability. Concurrent mutation of the same user's cart is
//! last-write-wins — commit correctness never depends on cart locking.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::error::{Result, StoreError};

#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's cart, or an empty cart if none exists yet.
    pub async fn get(&self, user_id: Uuid) -> Cart {
        self.carts.read().await.get(&user_id).cloned().unwrap_or_default()
    }

    /// Replaces the stored cart wholesale.
    pub async fn set(&self, user_id: Uuid, cart: Cart) {
        self.carts.write().await.insert(user_id, cart);
    }

    pub async fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: u32) -> Cart {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_default();
        cart.add_item(product_id, quantity);
        cart.clone()
    }

    /// Quantity 0 removes the line; the line must already exist.
    pub async fn update_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: u32) -> Result<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_default();
        if !cart.update_quantity(product_id, quantity) {
            return Err(StoreError::CartItemNotFound(product_id));
        }
        Ok(cart.clone())
    }

    pub async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Cart {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_default();
        cart.remove_item(product_id);
        cart.clone()
    }

    pub async fn clear(&self, user_id: Uuid) {
        self.carts.write().await.remove(&user_id);
    }
}
