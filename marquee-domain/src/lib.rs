pub mod events;
pub mod hold;
pub mod seat;

pub use hold::{HoldReceipt, PermanentAllocation, TemporaryHold};
pub use seat::{Conflict, ConflictKind, GroupKind, SeatGroup, SeatKey, FULL_TABLE};
