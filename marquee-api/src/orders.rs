use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use marquee_order::fulfillment::qr_code_url;
use marquee_order::models::{Order, OrderLine, OrderStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub event_id: Uuid,
    pub customer_email: String,
    /// The checkout hold backing this order; persisted so settlement can
    /// release it later.
    pub hold_id: Option<String>,
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub table_id: String,
    /// 0 buys the whole table.
    pub seat_no: i16,
    pub price_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub customer_email: String,
    pub status: OrderStatus,
    pub hold_id: Option<String>,
    pub lines: Vec<OrderLine>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            event_id: order.event_id,
            customer_email: order.customer_email,
            status: order.status,
            hold_id: order.hold_id,
            lines: order.lines,
            total_cents: order.total_cents,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub intent_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub code: String,
    pub table_id: String,
    pub seat_no: i16,
    pub qr_code_url: String,
}

#[derive(Debug, Serialize)]
pub struct TicketsResponse {
    pub order_id: Uuid,
    pub tickets: Vec<TicketResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(create_order))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/cancel", post(cancel_order))
        .route("/v1/orders/{id}/payment-intent", post(initialize_payment_intent))
        .route("/v1/orders/{id}/tickets", get(get_tickets))
}

/// POST /v1/orders
/// Create an order against a checkout hold
async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    if req.lines.is_empty() {
        return Err(AppError::ValidationError("order has no lines".to_string()));
    }
    if req.customer_email.is_empty() {
        return Err(AppError::ValidationError("customer email is required".to_string()));
    }

    let lines = req
        .lines
        .into_iter()
        .map(|l| OrderLine {
            table_id: l.table_id,
            seat_no: l.seat_no,
            price_cents: l.price_cents,
        })
        .collect();

    let order = Order::new(req.event_id, req.customer_email, req.hold_id, lines);
    state
        .orders
        .create_order(&order)
        .await
        .map_err(AppError::from_repo)?;

    tracing::info!(order_id = %order.id, event_id = %order.event_id, "order created");
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /v1/orders/:id
/// Retrieve order details
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .get_order(order_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {order_id}")))?;
    Ok(Json(order.into()))
}

/// POST /v1/orders/:id/cancel
/// Cancel an order and release its hold
async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .reconciler
        .abandon(order_id)
        .await
        .map_err(AppError::from_settlement)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/orders/:id/payment-intent
/// Initialize a payment intent for the order
async fn initialize_payment_intent(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let order = state
        .orders
        .get_order(order_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {order_id}")))?;

    let intent = state
        .payments
        .create_intent(order.id, order.total_cents, "USD")
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(PaymentIntentResponse {
        intent_id: intent.id,
        amount_cents: intent.amount_cents,
        currency: intent.currency,
        client_secret: intent.client_secret,
    }))
}

/// GET /v1/orders/:id/tickets
/// Issued tickets with their QR fetch URLs
async fn get_tickets(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<TicketsResponse>, AppError> {
    let tickets = state
        .orders
        .list_tickets(order_id)
        .await
        .map_err(AppError::from_repo)?;

    let tickets = tickets
        .into_iter()
        .map(|t| TicketResponse {
            qr_code_url: qr_code_url(&state.api_base_url, &t.code),
            code: t.code,
            table_id: t.table_id,
            seat_no: t.seat_no,
        })
        .collect();

    Ok(Json(TicketsResponse { order_id, tickets }))
}
