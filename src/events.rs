//! Best-effort order lifecycle events over NATS.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Completed {
        order_id: Uuid,
        user_id: Uuid,
        total: Decimal,
    },
    StatusChanged {
        order_id: Uuid,
        status: OrderStatus,
    },
}

impl OrderEvent {
    pub fn completed(order: &Order) -> Self {
        Self::Completed {
            order_id: order.id,
            user_id: order.user_id,
            total: order.total,
        }
    }

    pub fn status_changed(order: &Order) -> Self {
        Self::StatusChanged {
            order_id: order.id,
            status: order.status,
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "orders.completed",
            Self::StatusChanged { .. } => "orders.status",
        }
    }
}

/// Publishes order events when a NATS connection is configured. Publish
/// failures are logged and never fail the originating request.
#[derive(Clone)]
pub struct EventPublisher {
    client: async_nats::Client,
}

impl EventPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    pub async fn publish(&self, event: &OrderEvent) {
        let payload = match serde_json::to_vec(event) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode order event");
                return;
            }
        };
        if let Err(err) = self.client.publish(event.subject().to_string(), payload.into()).await {
            tracing::warn!(error = %err, subject = event.subject(), "failed to publish order event");
        }
    }
}
