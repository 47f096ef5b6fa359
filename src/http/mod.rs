//! HTTP surface: shared state, router, and handlers.

pub mod auth;
mod cart;
mod orders;

use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cart_store::CartStore;
use crate::catalog::ProductCatalog;
use crate::checkout::Checkout;
use crate::events::EventPublisher;
use crate::ledger::InventoryLedger;
use crate::orders::OrderRepository;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub carts: CartStore,
    pub ledger: InventoryLedger,
    pub orders: Arc<dyn OrderRepository>,
    pub checkout: Checkout,
    pub events: Option<EventPublisher>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderRepository>,
        events: Option<EventPublisher>,
    ) -> Self {
        let carts = CartStore::new();
        let ledger = InventoryLedger::new(Arc::clone(&catalog));
        let checkout = Checkout::new(
            Arc::clone(&catalog),
            carts.clone(),
            ledger.clone(),
            Arc::clone(&orders),
            events.clone(),
        );
        Self {
            catalog,
            carts,
            ledger,
            orders,
            checkout,
            events,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/add", post(cart::add_to_cart))
        .route("/cart/update", put(cart::update_item))
        .route("/cart/:product_id", delete(cart::remove_item))
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", patch(orders::update_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "storefront" }))
}
