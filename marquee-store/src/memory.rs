use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use marquee_core::{LockError, LockStore};
use marquee_domain::{seat, PermanentAllocation, SeatGroup, SeatKey, TemporaryHold};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

type LockKey = (Uuid, String, i16);

#[derive(Default)]
struct Tables {
    holds: HashMap<LockKey, TemporaryHold>,
    allocations: HashMap<LockKey, PermanentAllocation>,
}

impl Tables {
    fn sweep(&mut self, event_id: Uuid, now: DateTime<Utc>) {
        self.holds
            .retain(|(ev, _, _), h| *ev != event_id || !h.is_expired(now));
    }
}

/// In-process lock store with the same semantics as `PgLockStore`: one
/// mutex guard per operation stands in for one transaction. Used by tests
/// and local development.
#[derive(Default)]
pub struct MemoryLockStore {
    inner: Mutex<Tables>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw hold row, expiry included, bypassing the reserve path.
    /// Fixture support for expiry tests.
    pub async fn seed_hold(&self, hold: TemporaryHold) {
        let mut tables = self.inner.lock().await;
        let key = (hold.event_id, hold.table_id.clone(), hold.seat_no);
        tables.holds.insert(key, hold);
    }

    /// Seeds a raw allocation row, bypassing the promote path.
    pub async fn seed_allocation(&self, alloc: PermanentAllocation) {
        let mut tables = self.inner.lock().await;
        let key = (alloc.event_id, alloc.table_id.clone(), alloc.seat_no);
        tables.allocations.insert(key, alloc);
    }

    pub async fn hold_count(&self) -> usize {
        self.inner.lock().await.holds.len()
    }

    pub async fn allocation_count(&self) -> usize {
        self.inner.lock().await.allocations.len()
    }

    /// The order that owns an allocation, if any. Test observability.
    pub async fn allocation_owner(&self, event_id: Uuid, seat: &SeatKey) -> Option<Uuid> {
        let tables = self.inner.lock().await;
        tables
            .allocations
            .get(&(event_id, seat.table_id.clone(), seat.seat_no))
            .map(|a| a.order_id)
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn reserve(
        &self,
        event_id: Uuid,
        groups: &[SeatGroup],
        hold_id: &str,
        ttl_seconds: i64,
    ) -> Result<DateTime<Utc>, LockError> {
        let now = Utc::now();
        let mut tables = self.inner.lock().await;
        tables.sweep(event_id, now);

        let live: Vec<(SeatKey, String)> = tables
            .holds
            .iter()
            .filter(|((ev, _, _), _)| *ev == event_id)
            .map(|(_, h)| (h.seat(), h.hold_id.clone()))
            .collect();
        let sold: Vec<SeatKey> = tables
            .allocations
            .iter()
            .filter(|((ev, _, _), _)| *ev == event_id)
            .map(|(_, a)| a.seat())
            .collect();

        let conflicts = seat::find_conflicts(groups, &live, &sold, hold_id);
        if !conflicts.is_empty() {
            return Err(LockError::conflict(conflicts));
        }

        let expires_at = now + Duration::seconds(ttl_seconds);
        for key in groups.iter().flat_map(|g| g.seat_keys()) {
            tables.holds.insert(
                (event_id, key.table_id.clone(), key.seat_no),
                TemporaryHold {
                    event_id,
                    table_id: key.table_id,
                    seat_no: key.seat_no,
                    hold_id: hold_id.to_string(),
                    expires_at,
                    created_at: now,
                },
            );
        }
        Ok(expires_at)
    }

    async fn release(&self, hold_id: &str) -> Result<u64, LockError> {
        let mut tables = self.inner.lock().await;
        let before = tables.holds.len();
        tables.holds.retain(|_, h| h.hold_id != hold_id);
        Ok((before - tables.holds.len()) as u64)
    }

    async fn promote(
        &self,
        event_id: Uuid,
        order_id: Uuid,
        lines: &[SeatKey],
        hold_id: Option<&str>,
    ) -> Result<(), LockError> {
        let mut tables = self.inner.lock().await;

        for key in lines {
            let lock_key = (event_id, key.table_id.clone(), key.seat_no);
            // First writer wins; a re-delivered settlement changes nothing.
            tables
                .allocations
                .entry(lock_key)
                .or_insert_with(|| PermanentAllocation {
                    event_id,
                    order_id,
                    table_id: key.table_id.clone(),
                    seat_no: key.seat_no,
                });
        }

        if let Some(hold_id) = hold_id {
            tables.holds.retain(|_, h| h.hold_id != hold_id);
        }
        Ok(())
    }

    async fn active_seats(&self, event_id: Uuid) -> Result<Vec<SeatKey>, LockError> {
        let now = Utc::now();
        let mut tables = self.inner.lock().await;
        tables.sweep(event_id, now);

        Ok(tables
            .holds
            .values()
            .filter(|h| h.event_id == event_id)
            .map(|h| h.seat())
            .chain(
                tables
                    .allocations
                    .values()
                    .filter(|a| a.event_id == event_id)
                    .map(|a| a.seat()),
            )
            .collect())
    }
}
