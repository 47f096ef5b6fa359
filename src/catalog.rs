//! Catalog collaborator seam.
//!
//! Product reads and stock writes live outside this service; the trait here
//! is the only surface the pipeline and the ledger consume. The in-memory
//! implementation backs tests and doubles as a catalog stand-in.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::product::{ProductSnapshot, StockLevel};
use crate::error::Result;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductSnapshot>>;

    /// Applies a signed stock adjustment; negative `qty` restores stock.
    /// Unbounded stock is never mutated. Only the inventory ledger calls
    /// this, and only after observing the product under its per-product
    /// lock, so a missing product is a no-op.
    async fn decrement_stock(&self, id: Uuid, qty: i64) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<Uuid, ProductSnapshot>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product snapshot.
    pub async fn insert(&self, product: ProductSnapshot) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn stock_of(&self, id: Uuid) -> Option<StockLevel> {
        self.products.read().await.get(&id).map(|p| p.stock)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductSnapshot>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn decrement_stock(&self, id: Uuid, qty: i64) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(&id) {
            if let StockLevel::Bounded(n) = product.stock {
                product.stock = StockLevel::Bounded(n - qty);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn widget(stock: Option<i64>) -> ProductSnapshot {
        ProductSnapshot {
            id: Uuid::now_v7(),
            name: "widget".into(),
            price: Decimal::new(100, 2),
            stock: StockLevel::from_raw(stock),
        }
    }

    #[tokio::test]
    async fn decrement_moves_bounded_stock() {
        let catalog = InMemoryCatalog::new();
        let product = widget(Some(5));
        let id = product.id;
        catalog.insert(product).await;
        catalog.decrement_stock(id, 3).await.unwrap();
        assert_eq!(catalog.stock_of(id).await, Some(StockLevel::Bounded(2)));
        catalog.decrement_stock(id, -3).await.unwrap();
        assert_eq!(catalog.stock_of(id).await, Some(StockLevel::Bounded(5)));
    }

    #[tokio::test]
    async fn decrement_leaves_unbounded_stock_alone() {
        let catalog = InMemoryCatalog::new();
        let product = widget(None);
        let id = product.id;
        catalog.insert(product).await;
        catalog.decrement_stock(id, 10).await.unwrap();
        assert_eq!(catalog.stock_of(id).await, Some(StockLevel::Unbounded));
    }
}
