//! Integration tests against a live Redis instance.
//!
//! These are ignored by default; point `REDIS_URL` at a disposable Redis
//! and run with `cargo test -p tessera-redis -- --ignored`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use chrono::{Duration, Utc};
use tessera_core::{
    EventId, PendingReservation, PendingReservationStore, ReservationError, ReservationId,
    TicketQuantity,
};
use tessera_redis::RedisReservationStore;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

fn reservation_for(event_id: EventId, quantity: u32, window: Duration) -> PendingReservation {
    let now = Utc::now();
    PendingReservation {
        id: ReservationId::new(),
        event_id,
        customer_name: "Ada".into(),
        customer_email: "ada@example.org".into(),
        quantity: TicketQuantity::new(quantity).unwrap(),
        created_by: None,
        created_at: now,
        expires_at: now + window,
    }
}

#[tokio::test]
#[ignore = "requires a running Redis (REDIS_URL)"]
async fn put_get_delete_roundtrip() {
    let store = RedisReservationStore::new(&redis_url()).await.unwrap();
    let reservation = reservation_for(EventId::new(), 4, Duration::minutes(15));

    store.put(&reservation).await.unwrap();

    let fetched = store.get(reservation.id).await.unwrap();
    assert_eq!(fetched, Some(reservation.clone()));

    store.delete(reservation.id).await.unwrap();
    assert_eq!(store.get(reservation.id).await.unwrap(), None);

    // Idempotent: a second delete of the same id is not an error.
    store.delete(reservation.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis (REDIS_URL)"]
async fn count_sums_live_entries_per_event() {
    let store = RedisReservationStore::new(&redis_url()).await.unwrap();
    let event_id = EventId::new();
    let other_event = EventId::new();

    let first = reservation_for(event_id, 4, Duration::minutes(15));
    let second = reservation_for(event_id, 2, Duration::minutes(15));
    let unrelated = reservation_for(other_event, 7, Duration::minutes(15));
    store.put(&first).await.unwrap();
    store.put(&second).await.unwrap();
    store.put(&unrelated).await.unwrap();

    assert_eq!(store.count_active_for_event(event_id).await.unwrap(), 6);

    store.delete(first.id).await.unwrap();
    assert_eq!(store.count_active_for_event(event_id).await.unwrap(), 2);

    store.delete(second.id).await.unwrap();
    store.delete(unrelated.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis (REDIS_URL)"]
async fn expired_entries_vanish_from_count_and_get() {
    let store = RedisReservationStore::new(&redis_url()).await.unwrap();
    let event_id = EventId::new();

    let reservation = reservation_for(event_id, 3, Duration::milliseconds(300));
    store.put(&reservation).await.unwrap();
    assert_eq!(store.count_active_for_event(event_id).await.unwrap(), 3);

    tokio::time::sleep(std::time::Duration::from_millis(600)).await;

    assert_eq!(store.count_active_for_event(event_id).await.unwrap(), 0);
    assert_eq!(store.get(reservation.id).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running Redis (REDIS_URL)"]
async fn dead_on_arrival_put_is_refused() {
    let store = RedisReservationStore::new(&redis_url()).await.unwrap();

    let mut reservation = reservation_for(EventId::new(), 1, Duration::minutes(15));
    reservation.expires_at = reservation.created_at - Duration::seconds(1);

    let result = store.put(&reservation).await;
    assert_eq!(result, Err(ReservationError::AlreadyExpired));
}
