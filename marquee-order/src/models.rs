use chrono::{DateTime, Utc};
use marquee_domain::{SeatKey, FULL_TABLE};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Proposed,
    PaymentPending,
    Paid,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Proposed => "PROPOSED",
            OrderStatus::PaymentPending => "PAYMENT_PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Fulfilled => "FULFILLED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROPOSED" => Some(Self::Proposed),
            "PAYMENT_PENDING" => Some(Self::PaymentPending),
            "PAID" => Some(Self::Paid),
            "FULFILLED" => Some(Self::Fulfilled),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Legal lifecycle moves. Cancellation is reachable from every
    /// non-final state; Fulfilled and Cancelled are terminal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Proposed, PaymentPending)
                | (Proposed, Paid)
                | (PaymentPending, Paid)
                | (Paid, Fulfilled)
                | (Proposed, Cancelled)
                | (PaymentPending, Cancelled)
                | (Paid, Cancelled)
        )
    }
}

/// One purchasable line: a single seat, or the whole table when
/// `seat_no == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub table_id: String,
    pub seat_no: i16,
    pub price_cents: i64,
}

impl OrderLine {
    pub fn seat(&self) -> SeatKey {
        SeatKey::new(self.table_id.clone(), self.seat_no)
    }

    pub fn is_whole_table(&self) -> bool {
        self.seat_no == FULL_TABLE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub event_id: Uuid,
    pub customer_email: String,
    pub status: OrderStatus,
    /// The checkout hold this order was created against. Released when the
    /// order settles or dies.
    pub hold_id: Option<String>,
    pub lines: Vec<OrderLine>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(event_id: Uuid, customer_email: String, hold_id: Option<String>, lines: Vec<OrderLine>) -> Self {
        let total_cents = lines.iter().map(|l| l.price_cents).sum();
        Self {
            id: Uuid::new_v4(),
            event_id,
            customer_email,
            status: OrderStatus::Proposed,
            hold_id,
            lines,
            total_cents,
            created_at: Utc::now(),
        }
    }

    /// Validated status transition.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// An issued ticket: one row per order line, QR payload in `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub table_id: String,
    pub seat_no: i16,
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
