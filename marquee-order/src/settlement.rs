use crate::fulfillment::issue_tickets;
use crate::models::{OrderError, OrderStatus};
use crate::notify::{TicketDelivery, TicketNotifier};
use crate::repository::OrderRepository;
use marquee_core::{LockError, LockStore};
use marquee_domain::SeatKey;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("order repository failure: {0}")]
    Repository(Box<dyn std::error::Error + Send + Sync>),
}

/// Reconciles a confirmed payment with the seat-lock stores: temporary
/// holds become permanent allocations, tickets are issued, the customer is
/// notified. Safe to call again for the same order; re-delivered
/// settlement events converge on the same end state.
pub struct SettlementReconciler {
    orders: Arc<dyn OrderRepository>,
    locks: Arc<dyn LockStore>,
    notifier: Arc<dyn TicketNotifier>,
}

impl SettlementReconciler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        locks: Arc<dyn LockStore>,
        notifier: Arc<dyn TicketNotifier>,
    ) -> Self {
        Self {
            orders,
            locks,
            notifier,
        }
    }

    /// Promotes a paid order's seats into the permanent store and releases
    /// its checkout hold.
    ///
    /// The allocation writes and the hold release happen in one store
    /// transaction; the order only reads as PAID once they are committed,
    /// so a failure part-way leaves the order retryable rather than paid
    /// without its seats.
    pub async fn promote(&self, order_id: Uuid) -> Result<(), SettlementError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(SettlementError::Repository)?
            .ok_or(OrderError::NotFound(order_id))?;

        if order.status == OrderStatus::Fulfilled {
            info!(%order_id, "settlement re-delivered for fulfilled order, ignoring");
            return Ok(());
        }
        // Cancelled is terminal. A late success for an abandoned order must
        // not write allocations or resurrect the order; it needs a refund,
        // not a fulfillment.
        if order.status == OrderStatus::Cancelled {
            warn!(%order_id, "settlement arrived for a cancelled order, refusing");
            return Err(SettlementError::Order(OrderError::InvalidTransition {
                from: order.status.as_str().to_string(),
                to: OrderStatus::Paid.as_str().to_string(),
            }));
        }

        let lines: Vec<SeatKey> = order.lines.iter().map(|l| l.seat()).collect();
        self.locks
            .promote(order.event_id, order.id, &lines, order.hold_id.as_deref())
            .await?;

        let mut status = order.status;
        if status.can_transition_to(OrderStatus::Paid) {
            self.orders
                .update_order_status(order.id, OrderStatus::Paid)
                .await
                .map_err(SettlementError::Repository)?;
            status = OrderStatus::Paid;
        }

        let tickets = issue_tickets(&order);
        for ticket in &tickets {
            self.orders
                .add_ticket(ticket)
                .await
                .map_err(SettlementError::Repository)?;
        }

        // Delivery failures do not unwind the settlement; the tickets are on
        // record and the mail can be resent.
        let delivery = TicketDelivery {
            order_id: order.id,
            customer_email: order.customer_email.clone(),
            tickets,
        };
        if let Err(e) = self.notifier.send_tickets(&delivery).await {
            warn!(%order_id, error = %e, "ticket notification failed");
        }

        if status.can_transition_to(OrderStatus::Fulfilled) {
            self.orders
                .update_order_status(order.id, OrderStatus::Fulfilled)
                .await
                .map_err(SettlementError::Repository)?;
        }

        info!(%order_id, seats = order.lines.len(), "order settled");
        Ok(())
    }

    /// Releases an order's hold after a failed, cancelled, or timed-out
    /// payment, and parks the order in CANCELLED.
    pub async fn abandon(&self, order_id: Uuid) -> Result<(), SettlementError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(SettlementError::Repository)?
            .ok_or(OrderError::NotFound(order_id))?;

        if order.status.can_transition_to(OrderStatus::Cancelled) {
            self.orders
                .update_order_status(order.id, OrderStatus::Cancelled)
                .await
                .map_err(SettlementError::Repository)?;
        }

        if let Some(hold_id) = order.hold_id.as_deref() {
            let released = self.locks.release(hold_id).await?;
            info!(%order_id, hold_id, released, "hold released for abandoned order");
        }

        Ok(())
    }
}
