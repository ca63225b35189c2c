use chrono::{Duration, Utc};
use marquee_core::{LockError, LockStore};
use marquee_domain::{ConflictKind, PermanentAllocation, SeatKey, TemporaryHold};
use marquee_reservation::ReservationEngine;
use marquee_store::MemoryLockStore;
use std::sync::Arc;
use uuid::Uuid;

fn engine() -> (ReservationEngine, Arc<MemoryLockStore>) {
    let store = Arc::new(MemoryLockStore::new());
    (ReservationEngine::new(store.clone(), 10), store)
}

fn seats(table: &str, nums: &[i16]) -> Vec<SeatKey> {
    nums.iter().map(|&n| SeatKey::new(table, n)).collect()
}

fn conflict_seats(err: LockError) -> (ConflictKind, Vec<SeatKey>) {
    match err {
        LockError::Conflict { kind, conflicts } => {
            (kind, conflicts.into_iter().map(|c| c.seat).collect())
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn rejects_empty_seat_list_before_store_access() {
    let (engine, store) = engine();
    let err = engine
        .request_hold(Uuid::new_v4(), &[], 600, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LockError::Validation(_)));
    assert_eq!(store.hold_count().await, 0);
}

#[tokio::test]
async fn rejects_non_positive_ttl() {
    let (engine, _) = engine();
    for ttl in [0, -5] {
        let err = engine
            .request_hold(Uuid::new_v4(), &seats("A", &[1]), ttl, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::Validation(_)));
    }
}

#[tokio::test]
async fn rejects_seat_above_capacity() {
    let (engine, _) = engine();
    let err = engine
        .request_hold(Uuid::new_v4(), &seats("A", &[11]), 600, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LockError::Validation(_)));
}

#[tokio::test]
async fn overlapping_holds_conflict_and_renewal_succeeds() {
    let (engine, _) = engine();
    let event = Uuid::new_v4();

    // H1 takes (A,1),(A,2).
    let receipt = engine
        .request_hold(event, &seats("A", &[1, 2]), 600, Some("H1".to_string()))
        .await
        .unwrap();
    assert_eq!(receipt.hold_id, "H1");
    assert_eq!(receipt.seats, seats("A", &[1, 2]));

    // H2 wants (A,2),(A,3): whole request dies, conflict names (A,2).
    let err = engine
        .request_hold(event, &seats("A", &[2, 3]), 600, Some("H2".to_string()))
        .await
        .unwrap_err();
    let (kind, conflicting) = conflict_seats(err);
    assert_eq!(kind, ConflictKind::Held);
    assert_eq!(conflicting, seats("A", &[2]));

    // No partial grant: (A,3) is still free for H2 alone.
    engine
        .request_hold(event, &seats("A", &[3]), 600, Some("H2".to_string()))
        .await
        .unwrap();

    // H1 re-requesting its own seats is a renewal, not a conflict.
    let renewed = engine
        .request_hold(event, &seats("A", &[1, 2]), 600, Some("H1".to_string()))
        .await
        .unwrap();
    assert_eq!(renewed.seats, seats("A", &[1, 2]));
}

#[tokio::test]
async fn concurrent_requests_for_same_seat_have_one_winner() {
    let (engine, _) = engine();
    let event = Uuid::new_v4();
    let contested = seats("A", &[5]);

    let (a, b) = tokio::join!(
        engine.request_hold(event, &contested, 600, None),
        engine.request_hold(event, &contested, 600, None),
    );

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one concurrent request may win");

    let loser = if a.is_err() { a } else { b };
    let (kind, conflicting) = conflict_seats(loser.unwrap_err());
    assert_eq!(kind, ConflictKind::Held);
    assert_eq!(conflicting, contested);
}

#[tokio::test]
async fn full_table_hold_stored_as_sentinel_and_expanded_in_view() {
    let (engine, store) = engine();
    let event = Uuid::new_v4();

    let all: Vec<i16> = (1..=10).collect();
    let receipt = engine
        .request_hold(event, &seats("B", &all), 600, Some("H3".to_string()))
        .await
        .unwrap();

    // Ten requested seats collapse to one sentinel row.
    assert_eq!(receipt.seats, vec![SeatKey::new("B", 0)]);
    assert_eq!(store.hold_count().await, 1);

    // The availability view expands it back to ten seats.
    let view = engine.list_active(event).await.unwrap();
    assert_eq!(view, seats("B", &all));
}

#[tokio::test]
async fn full_table_request_blocked_by_any_sold_seat() {
    let (engine, store) = engine();
    let event = Uuid::new_v4();

    store
        .seed_allocation(PermanentAllocation {
            event_id: event,
            order_id: Uuid::new_v4(),
            table_id: "C".to_string(),
            seat_no: 7,
        })
        .await;

    let err = engine
        .request_hold(event, &seats("C", &[0]), 600, None)
        .await
        .unwrap_err();
    let (kind, conflicting) = conflict_seats(err);
    assert_eq!(kind, ConflictKind::Sold);
    assert_eq!(conflicting, seats("C", &[7]));
}

#[tokio::test]
async fn partial_request_blocked_by_whole_table_allocation() {
    let (engine, store) = engine();
    let event = Uuid::new_v4();

    store
        .seed_allocation(PermanentAllocation {
            event_id: event,
            order_id: Uuid::new_v4(),
            table_id: "D".to_string(),
            seat_no: 0,
        })
        .await;

    let err = engine
        .request_hold(event, &seats("D", &[4]), 600, None)
        .await
        .unwrap_err();
    let (kind, conflicting) = conflict_seats(err);
    assert_eq!(kind, ConflictKind::Sold);
    assert_eq!(conflicting, vec![SeatKey::new("D", 0)]);
}

#[tokio::test]
async fn sold_outranks_held_in_mixed_conflicts() {
    let (engine, store) = engine();
    let event = Uuid::new_v4();

    store
        .seed_allocation(PermanentAllocation {
            event_id: event,
            order_id: Uuid::new_v4(),
            table_id: "E".to_string(),
            seat_no: 1,
        })
        .await;
    engine
        .request_hold(event, &seats("E", &[2]), 600, Some("H9".to_string()))
        .await
        .unwrap();

    let err = engine
        .request_hold(event, &seats("E", &[1, 2]), 600, None)
        .await
        .unwrap_err();
    let (kind, conflicting) = conflict_seats(err);
    assert_eq!(kind, ConflictKind::Sold);
    assert_eq!(conflicting, seats("E", &[1, 2]));
}

#[tokio::test]
async fn expired_holds_are_swept_lazily() {
    let (engine, store) = engine();
    let event = Uuid::new_v4();
    let now = Utc::now();

    store
        .seed_hold(TemporaryHold {
            event_id: event,
            table_id: "F".to_string(),
            seat_no: 3,
            hold_id: "stale".to_string(),
            expires_at: now - Duration::seconds(30),
            created_at: now - Duration::seconds(630),
        })
        .await;

    // Never explicitly released, but absent after the lazy sweep.
    assert!(engine.list_active(event).await.unwrap().is_empty());
    assert_eq!(store.hold_count().await, 0);

    // And the seat is reservable again.
    engine
        .request_hold(event, &seats("F", &[3]), 600, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn release_frees_all_rows_of_a_hold() {
    let (engine, store) = engine();
    let event = Uuid::new_v4();

    let mut requested = seats("A", &[1, 2]);
    requested.extend(seats("B", &[0]));
    let receipt = engine.request_hold(event, &requested, 600, None).await.unwrap();
    assert_eq!(store.hold_count().await, 3);

    let released = engine.release(&receipt.hold_id).await.unwrap();
    assert_eq!(released, 3);
    assert!(engine.list_active(event).await.unwrap().is_empty());

    // Releasing again is harmless.
    assert_eq!(engine.release(&receipt.hold_id).await.unwrap(), 0);
}

#[tokio::test]
async fn view_is_deterministic_and_sorted() {
    let (engine, _) = engine();
    let event = Uuid::new_v4();

    engine
        .request_hold(event, &seats("B", &[9, 1]), 600, None)
        .await
        .unwrap();
    engine
        .request_hold(event, &seats("A", &[0]), 600, None)
        .await
        .unwrap();

    let view = engine.list_active(event).await.unwrap();
    let mut expected: Vec<SeatKey> = (1..=10).map(|n| SeatKey::new("A", n)).collect();
    expected.extend(seats("B", &[1, 9]));
    assert_eq!(view, expected);
}

#[tokio::test]
async fn events_are_isolated_from_each_other() {
    let (engine, _) = engine();
    let event_a = Uuid::new_v4();
    let event_b = Uuid::new_v4();

    engine
        .request_hold(event_a, &seats("A", &[1]), 600, Some("H1".to_string()))
        .await
        .unwrap();

    // Same table and seat under a different event is a different unit.
    engine
        .request_hold(event_b, &seats("A", &[1]), 600, Some("H2".to_string()))
        .await
        .unwrap();
    assert_eq!(engine.list_active(event_b).await.unwrap(), seats("A", &[1]));
}
