use crate::seat::SeatKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Broadcast to availability viewers whenever a hold lands.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeatHeldEvent {
    pub event_id: Uuid,
    pub seats: Vec<SeatKey>,
    pub hold_id: String,
    pub held_at: i64,
}
