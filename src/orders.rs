//! Order repository seam and the in-memory implementation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::error::{Result, StoreError};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Appends a new order with status `completed`. Write-once: the item
    /// list and total are immutable after this call.
    async fn create(&self, user_id: Uuid, items: Vec<OrderItem>, total: Decimal) -> Result<Order>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

    /// Newest first. Privileged callers only; enforced at the HTTP layer.
    async fn list_all(&self) -> Result<Vec<Order>>;

    /// Transitions restricted to pending→completed, pending→cancelled,
    /// completed→cancelled. Anything else is rejected.
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order>;
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, user_id: Uuid, items: Vec<OrderItem>, total: Decimal) -> Result<Order> {
        let order = Order::completed(user_id, items, total);
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.orders.read().await.iter().find(|o| o.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.orders.read().await.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::OrderNotFound(id))?;
        if !order.status.can_transition(status) {
            return Err(StoreError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }
        order.status = status;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: Decimal, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: Uuid::now_v7(),
            quantity,
            price_at_purchase: price,
        }
    }

    #[tokio::test]
    async fn created_orders_are_completed_and_retrievable() {
        let repo = InMemoryOrderRepository::new();
        let user = Uuid::now_v7();
        let order = repo
            .create(user, vec![line(Decimal::new(1000, 2), 3)], Decimal::new(3000, 2))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        let fetched = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(fetched, order);
        assert_eq!(repo.list_for_user(user).await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn listing_is_scoped_per_user() {
        let repo = InMemoryOrderRepository::new();
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());
        repo.create(alice, vec![line(Decimal::ONE, 1)], Decimal::ONE).await.unwrap();
        repo.create(bob, vec![line(Decimal::ONE, 1)], Decimal::ONE).await.unwrap();
        assert_eq!(repo.list_for_user(alice).await.unwrap().len(), 1);
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn completed_orders_can_only_be_cancelled() {
        let repo = InMemoryOrderRepository::new();
        let order = repo
            .create(Uuid::now_v7(), vec![line(Decimal::ONE, 1)], Decimal::ONE)
            .await
            .unwrap();
        let err = repo.update_status(order.id, OrderStatus::Pending).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        let cancelled = repo.update_status(order.id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        let err = repo.update_status(order.id, OrderStatus::Completed).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn status_update_on_unknown_order_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let err = repo
            .update_status(Uuid::now_v7(), OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OrderNotFound(_)));
    }
}
