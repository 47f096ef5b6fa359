//! Storefront order service binary.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::events::EventPublisher;
use storefront::http::{router, AppState};
use storefront::postgres::{PgCatalog, PgOrderRepository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let events = match std::env::var("NATS_URL") {
        Ok(url) => async_nats::connect(&url).await.ok().map(EventPublisher::new),
        Err(_) => None,
    };
    if events.is_some() {
        tracing::info!("order events will be published to NATS");
    }

    let state = AppState::new(
        Arc::new(PgCatalog::new(db.clone())),
        Arc::new(PgOrderRepository::new(db)),
        events,
    );
    let app = router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    tracing::info!("storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
