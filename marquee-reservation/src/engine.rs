use crate::view;
use chrono::Utc;
use marquee_core::{LockError, LockStore};
use marquee_domain::{seat, GroupKind, HoldReceipt, SeatGroup, SeatKey};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Grants, renews, and releases temporary seat holds against a shared
/// lock store. Stateless: every instance behind a load balancer sees the
/// same world through the store, and correctness rests on the store's
/// transactional guarantees, not on anything held here.
pub struct ReservationEngine {
    store: Arc<dyn LockStore>,
    table_capacity: i16,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn LockStore>, table_capacity: i16) -> Self {
        Self {
            store,
            table_capacity,
        }
    }

    pub fn table_capacity(&self) -> i16 {
        self.table_capacity
    }

    /// Places or renews a hold on the requested seats.
    ///
    /// The request is all-or-nothing: one conflicting seat anywhere rejects
    /// every group. Passing the `hold_id` from an earlier receipt renews
    /// that hold instead of conflicting with it. Validation failures are
    /// rejected before the store is touched.
    pub async fn request_hold(
        &self,
        event_id: Uuid,
        seats: &[SeatKey],
        ttl_seconds: i64,
        hold_id: Option<String>,
    ) -> Result<HoldReceipt, LockError> {
        if seats.is_empty() {
            return Err(LockError::Validation("seat list is empty".to_string()));
        }
        if ttl_seconds <= 0 {
            return Err(LockError::Validation(format!(
                "ttl must be a positive number of seconds, got {ttl_seconds}"
            )));
        }
        if let Some(bad) = seats.iter().find(|s| s.seat_no > self.table_capacity) {
            return Err(LockError::Validation(format!(
                "seat {} exceeds table capacity {}",
                bad.seat_no, self.table_capacity
            )));
        }

        // Non-positive seat numbers (other than the sentinel) drop out in
        // normalization; a request made only of them holds nothing.
        let groups: Vec<SeatGroup> = seat::normalize(seats, self.table_capacity)
            .into_iter()
            .filter(|g| !matches!(&g.kind, GroupKind::Partial(s) if s.is_empty()))
            .collect();
        if groups.is_empty() {
            return Err(LockError::Validation(
                "no reservable seats in request".to_string(),
            ));
        }

        let hold_id = hold_id.unwrap_or_else(generate_hold_id);
        debug!(%event_id, %hold_id, tables = groups.len(), "requesting hold");

        let expires_at = self
            .store
            .reserve(event_id, &groups, &hold_id, ttl_seconds)
            .await?;

        let resolved: Vec<SeatKey> = groups.iter().flat_map(|g| g.seat_keys()).collect();
        info!(%event_id, %hold_id, seats = resolved.len(), %expires_at, "hold granted");

        Ok(HoldReceipt {
            hold_id,
            seats: resolved,
            expires_at,
        })
    }

    /// Current availability picture for an event: expired holds swept,
    /// sentinels expanded to individual seats, deterministic order.
    pub async fn list_active(&self, event_id: Uuid) -> Result<Vec<SeatKey>, LockError> {
        let rows = self.store.active_seats(event_id).await?;
        Ok(view::expanded_view(&rows, self.table_capacity))
    }

    /// Drops every row of a hold. Unknown hold ids release zero rows.
    pub async fn release(&self, hold_id: &str) -> Result<u64, LockError> {
        if hold_id.is_empty() {
            return Err(LockError::Validation("hold id is empty".to_string()));
        }
        let released = self.store.release(hold_id).await?;
        info!(hold_id, released, "hold released");
        Ok(released)
    }
}

/// Millisecond timestamp prefix keeps ids roughly sortable in the store;
/// the uuid suffix makes collisions vanishingly unlikely.
fn generate_hold_id() -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_ids_are_unique() {
        let a = generate_hold_id();
        let b = generate_hold_id();
        assert_ne!(a, b);
        assert!(a.contains('-'));
    }
}
