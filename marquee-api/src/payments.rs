use async_trait::async_trait;
use chrono::Utc;
use marquee_core::payment::{PaymentAdapter, PaymentIntent, PaymentStatus};
use uuid::Uuid;

/// Stand-in gateway client: mints intents locally instead of calling out.
/// The real client lives outside this service and speaks the same trait.
pub struct SandboxPaymentAdapter;

#[async_trait]
impl PaymentAdapter for SandboxPaymentAdapter {
    async fn create_intent(
        &self,
        order_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        let id = format!("pi_{}", order_id.simple());
        tracing::info!(%order_id, intent = %id, amount_cents, "sandbox payment intent created");

        Ok(PaymentIntent {
            client_secret: Some(format!("{}_secret_{}", id, Uuid::new_v4().simple())),
            id,
            order_id,
            amount_cents,
            currency: currency.to_string(),
            status: PaymentStatus::RequiresPaymentMethod,
            created_at: Utc::now(),
        })
    }
}
