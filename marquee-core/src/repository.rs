use crate::error::LockError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_domain::{SeatGroup, SeatKey};
use uuid::Uuid;

/// Persistence seam for temporary holds and permanent allocations.
///
/// Every method is a single atomic unit against the backing store. The
/// engine keeps no state of its own, so multiple engine instances behind a
/// load balancer coordinate only through an implementation of this trait.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Conflict-check-then-write for one hold request.
    ///
    /// Atomically sweeps expired holds for the event, checks the requested
    /// groups against both stores, and on success upserts one hold row per
    /// seat key under `hold_id` with `expires_at = now + ttl_seconds`
    /// (upsert is what makes renewal under the same hold id succeed).
    /// Any conflict aborts the whole request; there are no partial grants.
    /// Returns the expiry timestamp written.
    async fn reserve(
        &self,
        event_id: Uuid,
        groups: &[SeatGroup],
        hold_id: &str,
        ttl_seconds: i64,
    ) -> Result<DateTime<Utc>, LockError>;

    /// Deletes every hold row carrying `hold_id`, returning how many were
    /// removed. Releasing an unknown or already-expired hold is not an error.
    async fn release(&self, hold_id: &str) -> Result<u64, LockError>;

    /// Promotes a paid order's seats into permanent allocations and releases
    /// its temporary hold, in one transaction. `lines` uses seat 0 for
    /// whole-table items. Inserts are idempotent (first writer wins), so
    /// re-delivery of the same settlement is a no-op.
    async fn promote(
        &self,
        event_id: Uuid,
        order_id: Uuid,
        lines: &[SeatKey],
        hold_id: Option<&str>,
    ) -> Result<(), LockError>;

    /// Lazy sweep of expired holds for the event, then the union of hold
    /// and allocation seat keys as stored (sentinels unexpanded).
    async fn active_seats(&self, event_id: Uuid) -> Result<Vec<SeatKey>, LockError>;
}
