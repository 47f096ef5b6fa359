//! Cart endpoints.
//!
//! Stock checks here are advisory: carts are not reservations, and the
//! commit pipeline re-checks availability authoritatively. The advisory
//! check compares the requested increment against current stock.

use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::auth::AuthUser;
use super::AppState;
use crate::domain::cart::Cart;
use crate::domain::product::StockLevel;
use crate::error::{Result, StoreError};

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: u32,
    /// `null` when the product has since vanished from the catalog; such
    /// lines contribute nothing to the total.
    pub product: Option<LineProduct>,
}

#[derive(Debug, Serialize)]
pub struct LineProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: StockLevel,
}

#[derive(Debug, Serialize)]
pub struct CartEnvelope {
    pub cart: Cart,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i64,
}

pub(super) async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CartView>> {
    let cart = state.carts.get(user.user_id).await;
    let mut items = Vec::with_capacity(cart.items.len());
    let mut total = Decimal::ZERO;
    for line in &cart.items {
        let product = state.catalog.find_by_id(line.product_id).await?;
        if let Some(p) = &product {
            total += p.price * Decimal::from(line.quantity);
        }
        items.push(CartLine {
            product_id: line.product_id,
            quantity: line.quantity,
            product: product.map(|p| LineProduct {
                name: p.name,
                price: p.price,
                stock: p.stock,
            }),
        });
    }
    Ok(Json(CartView { items, total }))
}

pub(super) async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartEnvelope>> {
    req.validate().map_err(|e| StoreError::Validation(e.to_string()))?;
    let quantity = u32::try_from(req.quantity)
        .map_err(|_| StoreError::Validation("quantity out of range".into()))?;
    let product = state
        .catalog
        .find_by_id(req.product_id)
        .await?
        .ok_or(StoreError::ProductNotFound(req.product_id))?;
    if !state.ledger.get_available(req.product_id).await?.covers(quantity) {
        return Err(StoreError::InsufficientStock {
            product_id: product.id,
            name: product.name,
        });
    }
    let cart = state.carts.add_item(user.user_id, req.product_id, quantity).await;
    Ok(Json(CartEnvelope { cart }))
}

pub(super) async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateCartRequest>,
) -> Result<Json<CartEnvelope>> {
    req.validate().map_err(|e| StoreError::Validation(e.to_string()))?;
    let quantity = u32::try_from(req.quantity)
        .map_err(|_| StoreError::Validation("quantity out of range".into()))?;
    let current = state.carts.get(user.user_id).await;
    if !current.items.iter().any(|i| i.product_id == req.product_id) {
        return Err(StoreError::CartItemNotFound(req.product_id));
    }
    if quantity > 0 {
        let product = state
            .catalog
            .find_by_id(req.product_id)
            .await?
            .ok_or(StoreError::ProductNotFound(req.product_id))?;
        if !state.ledger.get_available(req.product_id).await?.covers(quantity) {
            return Err(StoreError::InsufficientStock {
                product_id: product.id,
                name: product.name,
            });
        }
    }
    let cart = state
        .carts
        .update_quantity(user.user_id, req.product_id, quantity)
        .await?;
    Ok(Json(CartEnvelope { cart }))
}

pub(super) async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartEnvelope>> {
    let cart = state.carts.remove_item(user.user_id, product_id).await;
    Ok(Json(CartEnvelope { cart }))
}

pub(super) async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<serde_json::Value> {
    state.carts.clear(user.user_id).await;
    Json(serde_json::json!({ "message": "cart cleared" }))
}
