use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use marquee_core::payment::PaymentStatus;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StripeWebhook {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: PaymentIntentObject,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    pub status: String,
    pub metadata: Option<serde_json::Value>,
}

impl PaymentIntentObject {
    /// Our intents carry the order id in provider metadata.
    fn order_id(&self) -> Option<Uuid> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("order_id"))
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

/// POST /v1/webhooks/payments/stripe
/// Receive payment status updates from the gateway
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    Json(payload): Json<StripeWebhook>,
) -> Result<StatusCode, AppError> {
    tracing::info!(
        event = %payload.id,
        "Received webhook: {} for intent {}",
        payload.type_,
        payload.data.object.id
    );

    let Some(status) = payload
        .type_
        .strip_prefix("payment_intent.")
        .and_then(PaymentStatus::from_provider)
    else {
        // Unknown event types are acknowledged so the gateway stops retrying.
        return Ok(StatusCode::OK);
    };

    let Some(order_id) = payload.data.object.order_id() else {
        tracing::warn!(intent = %payload.data.object.id, "webhook without order_id metadata");
        return Ok(StatusCode::OK);
    };

    match status {
        PaymentStatus::Succeeded => {
            // Settlement is idempotent: the gateway re-delivering this event
            // converges on the same allocations and tickets.
            state
                .reconciler
                .promote(order_id)
                .await
                .map_err(AppError::from_settlement)?;
            tracing::info!(%order_id, "order settled via webhook");
        }
        PaymentStatus::Failed | PaymentStatus::Canceled => {
            state
                .reconciler
                .abandon(order_id)
                .await
                .map_err(AppError::from_settlement)?;
            tracing::info!(%order_id, ?status, "order abandoned via webhook");
        }
        PaymentStatus::Processing | PaymentStatus::RequiresPaymentMethod => {}
    }

    Ok(StatusCode::OK)
}
