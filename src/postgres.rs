//! Postgres-backed catalog and order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::product::{ProductSnapshot, StockLevel};
use crate::error::{Result, StoreError};
use crate::orders::OrderRepository;

#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    stock: Option<i64>,
}

impl From<ProductRow> for ProductSnapshot {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: StockLevel::from_raw(row.stock),
        }
    }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductSnapshot>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, stock FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ProductSnapshot::from))
    }

    async fn decrement_stock(&self, id: Uuid, qty: i64) -> Result<()> {
        // NULL stock is the unbounded sentinel and is never mutated.
        sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock IS NOT NULL")
            .bind(id)
            .bind(qty)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItem>>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, quantity, price_at_purchase \
             FROM order_items WHERE order_id = ANY($1)",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;
        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            by_order.entry(order_id).or_default().push(OrderItem::try_from(row)?);
        }
        Ok(by_order)
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut by_order = self.load_items(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order> {
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items,
            total: self.total,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    price_at_purchase: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = StoreError;

    fn try_from(row: OrderItemRow) -> Result<Self> {
        let quantity = u32::try_from(row.quantity)
            .map_err(|_| StoreError::Storage(format!("order item quantity {} out of range", row.quantity)))?;
        Ok(Self {
            product_id: row.product_id,
            quantity,
            price_at_purchase: row.price_at_purchase,
        })
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    OrderStatus::parse(raw).ok_or_else(|| StoreError::Storage(format!("unknown order status {raw:?}")))
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, user_id: Uuid, items: Vec<OrderItem>, total: Decimal) -> Result<Order> {
        let order = Order::completed(user_id, items, total);
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO orders (id, user_id, total, status, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;
        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price_at_purchase) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::now_v7())
            .bind(order.id)
            .bind(item.product_id)
            .bind(i64::from(item.quantity))
            .bind(item.price_at_purchase)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, total, status, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };
        let mut by_order = self.load_items(&[id]).await?;
        let items = by_order.remove(&id).unwrap_or_default();
        Ok(Some(row.into_order(items)?))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, total, status, created_at FROM orders \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.assemble(rows).await
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, total, status, created_at FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.assemble(rows).await
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, total, status, created_at FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::OrderNotFound(id))?;
        let current = parse_status(&row.status)?;
        if !current.can_transition(status) {
            return Err(StoreError::InvalidTransition {
                from: current,
                to: status,
            });
        }
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        self.find_by_id(id)
            .await?
            .ok_or(StoreError::OrderNotFound(id))
    }
}
