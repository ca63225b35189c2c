use crate::models::Ticket;
use async_trait::async_trait;
use uuid::Uuid;

/// Everything the mail pipeline needs to deliver an order's tickets.
#[derive(Debug, Clone)]
pub struct TicketDelivery {
    pub order_id: Uuid,
    pub customer_email: String,
    pub tickets: Vec<Ticket>,
}

/// Outbound notification seam. Template rendering and SMTP live outside
/// the core; settlement only hands the delivery over.
#[async_trait]
pub trait TicketNotifier: Send + Sync {
    async fn send_tickets(
        &self,
        delivery: &TicketDelivery,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Logs deliveries instead of sending them. Default wiring for local runs
/// and tests.
pub struct LogNotifier;

#[async_trait]
impl TicketNotifier for LogNotifier {
    async fn send_tickets(
        &self,
        delivery: &TicketDelivery,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            order_id = %delivery.order_id,
            email = %delivery.customer_email,
            tickets = delivery.tickets.len(),
            "ticket delivery dispatched"
        );
        Ok(())
    }
}
