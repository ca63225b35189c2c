use crate::models::{Order, OrderStatus, Ticket};
use async_trait::async_trait;
use uuid::Uuid;

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Records an issued ticket. Keyed by (order_id, table_id, seat_no);
    /// inserting the same key again is a no-op so settlement re-delivery
    /// cannot duplicate tickets.
    async fn add_ticket(
        &self,
        ticket: &Ticket,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_tickets(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>>;
}
