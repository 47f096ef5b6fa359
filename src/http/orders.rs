//! Order endpoints; `POST /orders` is the commit pipeline entry point.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::AuthUser;
use super::AppState;
use crate::checkout::ItemRequest;
use crate::domain::order::{Order, OrderStatus};
use crate::error::{Result, StoreError};
use crate::events::OrderEvent;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Option<Vec<OrderItemPayload>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrdersEnvelope {
    pub orders: Vec<Order>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub(super) async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    body: Option<Json<CreateOrderRequest>>,
) -> Result<(StatusCode, Json<OrderEnvelope>)> {
    let explicit = body.and_then(|Json(req)| req.items).map(|items| {
        items
            .into_iter()
            .map(|i| ItemRequest {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect()
    });
    let order = state.checkout.place_order(user.user_id, explicit).await?;
    Ok((StatusCode::CREATED, Json(OrderEnvelope { order })))
}

pub(super) async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<OrdersEnvelope>> {
    let orders = if user.is_admin() {
        state.orders.list_all().await?
    } else {
        state.orders.list_for_user(user.user_id).await?
    };
    Ok(Json(OrdersEnvelope { orders }))
}

pub(super) async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderEnvelope>> {
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or(StoreError::OrderNotFound(id))?;
    if !user.is_admin() && order.user_id != user.user_id {
        return Err(StoreError::Forbidden);
    }
    Ok(Json(OrderEnvelope { order }))
}

pub(super) async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderEnvelope>> {
    if !user.is_admin() {
        return Err(StoreError::Forbidden);
    }
    let status = OrderStatus::parse(&req.status)
        .ok_or_else(|| StoreError::Validation(format!("invalid status {:?}", req.status)))?;
    let order = state.orders.update_status(id, status).await?;
    if let Some(events) = &state.events {
        events.publish(&OrderEvent::status_changed(&order)).await;
    }
    Ok(Json(OrderEnvelope { order }))
}
