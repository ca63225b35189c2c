use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_core::{LockError, LockStore};
use marquee_domain::{seat, SeatGroup, SeatKey};
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed lock store. Every operation runs in one SERIALIZABLE
/// transaction so conflict-check-then-write is atomic under concurrency;
/// the composite primary keys on both tables are the backstop below that.
pub struct PgLockStore {
    pool: PgPool,
}

impl PgLockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct HoldRow {
    table_id: String,
    seat_no: i16,
    hold_id: String,
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    table_id: String,
    seat_no: i16,
}

impl SeatRow {
    fn into_key(self) -> SeatKey {
        SeatKey::new(self.table_id, self.seat_no)
    }
}

#[async_trait]
impl LockStore for PgLockStore {
    async fn reserve(
        &self,
        event_id: Uuid,
        groups: &[SeatGroup],
        hold_id: &str,
        ttl_seconds: i64,
    ) -> Result<DateTime<Utc>, LockError> {
        let mut tx = self.pool.begin().await.map_err(LockError::store)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(LockError::store)?;

        // Lazy sweep: expiry is enforced here, at write time, not by any
        // background process.
        sqlx::query("DELETE FROM seat_locks WHERE event_id = $1 AND expires_at <= NOW()")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(LockError::store)?;

        let tables: Vec<String> = groups.iter().map(|g| g.table_id.clone()).collect();

        let holds: Vec<HoldRow> = sqlx::query_as(
            "SELECT table_id, seat_no, hold_id FROM seat_locks \
             WHERE event_id = $1 AND table_id = ANY($2) AND expires_at > NOW()",
        )
        .bind(event_id)
        .bind(&tables)
        .fetch_all(&mut *tx)
        .await
        .map_err(LockError::store)?;

        let allocations: Vec<SeatRow> = sqlx::query_as(
            "SELECT table_id, seat_no FROM done_seatlocks \
             WHERE event_id = $1 AND table_id = ANY($2)",
        )
        .bind(event_id)
        .bind(&tables)
        .fetch_all(&mut *tx)
        .await
        .map_err(LockError::store)?;

        let live: Vec<(SeatKey, String)> = holds
            .into_iter()
            .map(|h| (SeatKey::new(h.table_id, h.seat_no), h.hold_id))
            .collect();
        let sold: Vec<SeatKey> = allocations.into_iter().map(SeatRow::into_key).collect();

        let conflicts = seat::find_conflicts(groups, &live, &sold, hold_id);
        if !conflicts.is_empty() {
            tx.rollback().await.map_err(LockError::store)?;
            return Err(LockError::conflict(conflicts));
        }

        // One expiry for the whole hold, taken from the store clock.
        let expires_at: DateTime<Utc> =
            sqlx::query_scalar("SELECT NOW() + make_interval(secs => $1)")
                .bind(ttl_seconds as f64)
                .fetch_one(&mut *tx)
                .await
                .map_err(LockError::store)?;

        for key in groups.iter().flat_map(|g| g.seat_keys()) {
            // Upsert keyed on (event_id, table_id, seat_no): a re-request
            // under the same hold id refreshes owner and expiry in place.
            sqlx::query(
                "INSERT INTO seat_locks (event_id, table_id, seat_no, hold_id, expires_at) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (event_id, table_id, seat_no) \
                 DO UPDATE SET hold_id = EXCLUDED.hold_id, expires_at = EXCLUDED.expires_at",
            )
            .bind(event_id)
            .bind(&key.table_id)
            .bind(key.seat_no)
            .bind(hold_id)
            .bind(expires_at)
            .execute(&mut *tx)
            .await
            .map_err(LockError::store)?;
        }

        tx.commit().await.map_err(LockError::store)?;
        Ok(expires_at)
    }

    async fn release(&self, hold_id: &str) -> Result<u64, LockError> {
        let result = sqlx::query("DELETE FROM seat_locks WHERE hold_id = $1")
            .bind(hold_id)
            .execute(&self.pool)
            .await
            .map_err(LockError::store)?;
        Ok(result.rows_affected())
    }

    async fn promote(
        &self,
        event_id: Uuid,
        order_id: Uuid,
        lines: &[SeatKey],
        hold_id: Option<&str>,
    ) -> Result<(), LockError> {
        let mut tx = self.pool.begin().await.map_err(LockError::store)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(LockError::store)?;

        for key in lines {
            // First writer wins; settlement re-delivery lands on DO NOTHING.
            sqlx::query(
                "INSERT INTO done_seatlocks (event_id, order_id, table_id, seat_no) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (event_id, table_id, seat_no) DO NOTHING",
            )
            .bind(event_id)
            .bind(order_id)
            .bind(&key.table_id)
            .bind(key.seat_no)
            .execute(&mut *tx)
            .await
            .map_err(LockError::store)?;
        }

        // The hold is superseded by the allocations; drop all of its rows,
        // whatever tables they landed on.
        if let Some(hold_id) = hold_id {
            sqlx::query("DELETE FROM seat_locks WHERE hold_id = $1")
                .bind(hold_id)
                .execute(&mut *tx)
                .await
                .map_err(LockError::store)?;
        }

        tx.commit().await.map_err(LockError::store)?;
        Ok(())
    }

    async fn active_seats(&self, event_id: Uuid) -> Result<Vec<SeatKey>, LockError> {
        let mut tx = self.pool.begin().await.map_err(LockError::store)?;

        sqlx::query("DELETE FROM seat_locks WHERE event_id = $1 AND expires_at <= NOW()")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(LockError::store)?;

        let held: Vec<SeatRow> =
            sqlx::query_as("SELECT table_id, seat_no FROM seat_locks WHERE event_id = $1")
                .bind(event_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(LockError::store)?;

        let sold: Vec<SeatRow> =
            sqlx::query_as("SELECT table_id, seat_no FROM done_seatlocks WHERE event_id = $1")
                .bind(event_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(LockError::store)?;

        tx.commit().await.map_err(LockError::store)?;

        Ok(held
            .into_iter()
            .chain(sold)
            .map(SeatRow::into_key)
            .collect())
    }
}
