use marquee_core::payment::PaymentAdapter;
use marquee_domain::events::SeatHeldEvent;
use marquee_order::{OrderRepository, SettlementReconciler};
use marquee_reservation::ReservationEngine;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReservationEngine>,
    pub orders: Arc<dyn OrderRepository>,
    pub reconciler: Arc<SettlementReconciler>,
    pub payments: Arc<dyn PaymentAdapter>,
    pub sse_tx: broadcast::Sender<SeatHeldEvent>,
    pub api_base_url: String,
    pub default_hold_ttl_seconds: i64,
}
