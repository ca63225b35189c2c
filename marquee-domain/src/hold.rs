use crate::seat::SeatKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row in `seat_locks`: a time-limited reservation owned by whoever
/// holds the `hold_id` string. Unique per (event_id, table_id, seat_no).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporaryHold {
    pub event_id: Uuid,
    pub table_id: String,
    pub seat_no: i16,
    pub hold_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TemporaryHold {
    pub fn seat(&self) -> SeatKey {
        SeatKey::new(self.table_id.clone(), self.seat_no)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A row in `done_seatlocks`: a seat permanently taken by a paid order.
/// Never deleted in normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermanentAllocation {
    pub event_id: Uuid,
    pub order_id: Uuid,
    pub table_id: String,
    pub seat_no: i16,
}

impl PermanentAllocation {
    pub fn seat(&self) -> SeatKey {
        SeatKey::new(self.table_id.clone(), self.seat_no)
    }
}

/// What a successful hold request returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldReceipt {
    pub hold_id: String,
    pub seats: Vec<SeatKey>,
    pub expires_at: DateTime<Utc>,
}
