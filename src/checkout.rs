//! The cart-to-order commit pipeline.
//!
//! The only component that turns a cart into an order. Reservations happen
//! one item at a time; the compensating release pass on failure is what
//! gives the set of reservations all-or-nothing semantics without a
//! multi-key transaction primitive. A commit attempt moves through
//! resolve → validate/price → reserve → persist → clear, and any failure
//! along the way leaves inventory, cart, and order storage exactly as they
//! were before the attempt.

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::cart_store::CartStore;
use crate::catalog::ProductCatalog;
use crate::domain::order::{Order, OrderItem};
use crate::error::{Result, StoreError};
use crate::events::{EventPublisher, OrderEvent};
use crate::ledger::{InventoryLedger, Reservation};
use crate::orders::OrderRepository;

/// One requested order line, before validation.
#[derive(Clone, Debug)]
pub struct ItemRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// A validated line with the price snapshotted from the current catalog.
struct PricedLine {
    name: String,
    item: OrderItem,
}

#[derive(Clone)]
pub struct Checkout {
    catalog: Arc<dyn ProductCatalog>,
    carts: CartStore,
    ledger: InventoryLedger,
    orders: Arc<dyn OrderRepository>,
    events: Option<EventPublisher>,
}

impl Checkout {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        carts: CartStore,
        ledger: InventoryLedger,
        orders: Arc<dyn OrderRepository>,
        events: Option<EventPublisher>,
    ) -> Self {
        Self {
            catalog,
            carts,
            ledger,
            orders,
            events,
        }
    }

    /// Runs one commit attempt. Prefers the explicit item list; an absent or
    /// empty payload falls back to the user's stored cart, and only a
    /// cart-sourced commit clears the cart afterwards. No automatic retries:
    /// callers either receive a complete [`Order`] or a specific failure.
    pub async fn place_order(
        &self,
        user_id: Uuid,
        explicit: Option<Vec<ItemRequest>>,
    ) -> Result<Order> {
        let (requested, from_cart) = match explicit {
            Some(items) if !items.is_empty() => (items, false),
            _ => {
                let cart = self.carts.get(user_id).await;
                let items = cart
                    .items
                    .iter()
                    .map(|i| ItemRequest {
                        product_id: i.product_id,
                        quantity: i64::from(i.quantity),
                    })
                    .collect();
                (items, true)
            }
        };
        if requested.is_empty() {
            return Err(StoreError::EmptyOrder);
        }

        // Validation and pricing read the current catalog state: prices are
        // snapshotted here, not at add-to-cart time. Any missing product or
        // bad quantity aborts the whole commit before anything is reserved.
        let mut lines = Vec::with_capacity(requested.len());
        let mut total = Decimal::ZERO;
        for request in &requested {
            let product = self
                .catalog
                .find_by_id(request.product_id)
                .await?
                .ok_or(StoreError::ProductNotFound(request.product_id))?;
            let quantity = u32::try_from(request.quantity)
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(|| StoreError::InvalidQuantity {
                    product_id: product.id,
                    name: product.name.clone(),
                })?;
            total += product.price * Decimal::from(quantity);
            lines.push(PricedLine {
                item: OrderItem {
                    product_id: product.id,
                    quantity,
                    price_at_purchase: product.price,
                },
                name: product.name,
            });
        }

        // Reserve in caller order. On any failure, release everything
        // reserved in this pass so a partial multi-item commit never sticks.
        let mut reserved: Vec<(Uuid, u32)> = Vec::new();
        for line in &lines {
            match self.ledger.try_reserve(line.item.product_id, line.item.quantity).await {
                Ok(Reservation::Reserved) => {
                    reserved.push((line.item.product_id, line.item.quantity));
                }
                Ok(Reservation::InsufficientStock { available }) => {
                    tracing::debug!(
                        product = %line.item.product_id,
                        requested = line.item.quantity,
                        available,
                        "reservation failed, rolling back"
                    );
                    self.roll_back(&reserved).await;
                    return Err(StoreError::InsufficientStock {
                        product_id: line.item.product_id,
                        name: line.name.clone(),
                    });
                }
                Err(err) => {
                    self.roll_back(&reserved).await;
                    return Err(err);
                }
            }
        }

        // All reservations held; the order write is the commit point. A
        // failed write releases them so the attempt leaves no trace.
        let items: Vec<OrderItem> = lines.into_iter().map(|l| l.item).collect();
        let order = match self.orders.create(user_id, items, total).await {
            Ok(order) => order,
            Err(err) => {
                self.roll_back(&reserved).await;
                return Err(err);
            }
        };

        // An explicit payload does not implicitly touch the cart.
        if from_cart {
            self.carts.clear(user_id).await;
        }
        if let Some(events) = &self.events {
            events.publish(&OrderEvent::completed(&order)).await;
        }
        tracing::info!(order = %order.id, user = %user_id, total = %order.total, "order committed");
        Ok(order)
    }

    async fn roll_back(&self, reserved: &[(Uuid, u32)]) {
        for (product_id, quantity) in reserved {
            if let Err(err) = self.ledger.release(*product_id, *quantity).await {
                tracing::warn!(
                    product = %product_id,
                    quantity,
                    error = %err,
                    "failed to release reservation during rollback"
                );
            }
        }
    }
}
