use marquee_api::{app, AppState};
use marquee_order::notify::LogNotifier;
use marquee_order::SettlementReconciler;
use marquee_reservation::ReservationEngine;
use marquee_store::{DbClient, PgLockStore, PgOrderRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = marquee_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let lock_store = Arc::new(PgLockStore::new(db.pool.clone()));
    let orders = Arc::new(PgOrderRepository::new(db.pool.clone()));

    let engine = Arc::new(ReservationEngine::new(
        lock_store.clone(),
        config.business_rules.table_capacity,
    ));
    let reconciler = Arc::new(SettlementReconciler::new(
        orders.clone(),
        lock_store,
        Arc::new(LogNotifier),
    ));

    // SSE Broadcast Channel
    let (sse_tx, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        engine,
        orders,
        reconciler,
        payments: Arc::new(marquee_api::payments::SandboxPaymentAdapter),
        sse_tx,
        api_base_url: config.api.base_url.clone(),
        default_hold_ttl_seconds: config.business_rules.hold_ttl_seconds,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
