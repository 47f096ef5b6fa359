//! Inventory ledger: the sole writer of stock levels.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::domain::product::StockLevel;
use crate::error::{Result, StoreError};

/// Outcome of a reservation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reservation {
    Reserved,
    InsufficientStock { available: i64 },
}

/// Serializes stock mutation per product key.
///
/// `try_reserve` observes and decrements stock under one per-product lock —
/// never as a separate read-then-write — so two concurrent requests against
/// a product with one unit left can never both succeed. Disjoint products
/// do not contend.
#[derive(Clone)]
pub struct InventoryLedger {
    catalog: Arc<dyn ProductCatalog>,
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl InventoryLedger {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            catalog,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn product_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id).or_default().clone()
    }

    /// Current readable stock; errors when the product is absent entirely.
    pub async fn get_available(&self, id: Uuid) -> Result<StockLevel> {
        let snapshot = self
            .catalog
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))?;
        Ok(snapshot.stock)
    }

    /// Atomically decrements stock when `current stock >= quantity`.
    /// Unbounded stock always reserves and performs no mutation.
    pub async fn try_reserve(&self, id: Uuid, quantity: u32) -> Result<Reservation> {
        let lock = self.product_lock(id).await;
        let _guard = lock.lock().await;
        let snapshot = self
            .catalog
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))?;
        match snapshot.stock {
            StockLevel::Unbounded => Ok(Reservation::Reserved),
            StockLevel::Bounded(available) if available >= i64::from(quantity) => {
                self.catalog.decrement_stock(id, i64::from(quantity)).await?;
                tracing::debug!(product = %id, quantity, remaining = available - i64::from(quantity), "stock reserved");
                Ok(Reservation::Reserved)
            }
            StockLevel::Bounded(available) => Ok(Reservation::InsufficientStock { available }),
        }
    }

    /// Restores previously reserved stock; the compensation half of a
    /// commit that failed after some reservations already succeeded.
    pub async fn release(&self, id: Uuid, quantity: u32) -> Result<()> {
        let lock = self.product_lock(id).await;
        let _guard = lock.lock().await;
        self.catalog.decrement_stock(id, -i64::from(quantity)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::domain::product::ProductSnapshot;
    use rust_decimal::Decimal;

    async fn ledger_with(stock: Option<i64>) -> (InventoryLedger, Uuid) {
        let catalog = Arc::new(InMemoryCatalog::new());
        let id = Uuid::now_v7();
        catalog
            .insert(ProductSnapshot {
                id,
                name: "widget".into(),
                price: Decimal::new(100, 2),
                stock: StockLevel::from_raw(stock),
            })
            .await;
        (InventoryLedger::new(catalog), id)
    }

    #[tokio::test]
    async fn reserve_within_stock_succeeds_and_decrements() {
        let (ledger, id) = ledger_with(Some(5)).await;
        assert_eq!(ledger.try_reserve(id, 3).await.unwrap(), Reservation::Reserved);
        assert_eq!(ledger.get_available(id).await.unwrap(), StockLevel::Bounded(2));
    }

    #[tokio::test]
    async fn reserve_beyond_stock_fails_and_leaves_stock_unchanged() {
        let (ledger, id) = ledger_with(Some(2)).await;
        assert_eq!(
            ledger.try_reserve(id, 3).await.unwrap(),
            Reservation::InsufficientStock { available: 2 }
        );
        assert_eq!(ledger.get_available(id).await.unwrap(), StockLevel::Bounded(2));
    }

    #[tokio::test]
    async fn unbounded_stock_reserves_without_mutation() {
        let (ledger, id) = ledger_with(None).await;
        assert_eq!(ledger.try_reserve(id, 1_000_000).await.unwrap(), Reservation::Reserved);
        assert_eq!(ledger.get_available(id).await.unwrap(), StockLevel::Unbounded);
    }

    #[tokio::test]
    async fn release_restores_reserved_stock() {
        let (ledger, id) = ledger_with(Some(4)).await;
        ledger.try_reserve(id, 4).await.unwrap();
        ledger.release(id, 4).await.unwrap();
        assert_eq!(ledger.get_available(id).await.unwrap(), StockLevel::Bounded(4));
    }

    #[tokio::test]
    async fn reserve_on_missing_product_is_not_found() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let ledger = InventoryLedger::new(catalog);
        let id = Uuid::now_v7();
        assert!(matches!(
            ledger.try_reserve(id, 1).await.unwrap_err(),
            StoreError::ProductNotFound(missing) if missing == id
        ));
    }
}
