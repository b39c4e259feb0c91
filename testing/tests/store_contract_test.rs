//! Store contract tests for the in-memory implementations.
//!
//! The production adapters are exercised against live services; these
//! tests pin the same contract onto the test doubles so engine tests rest
//! on stores with known behavior.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use chrono::{Duration, Utc};
use std::sync::Arc;
use tessera_core::{
    Clock, ConfirmedPurchase, ConfirmedPurchaseLedger, EventId, PendingReservation,
    PendingReservationStore, PurchaseId, ReservationError, ReservationId, TicketQuantity, UserId,
};
use tessera_testing::{InMemoryPurchaseLedger, InMemoryReservationStore, ManualClock};

fn reservation_at(
    clock: &ManualClock,
    event_id: EventId,
    quantity: u32,
    window: Duration,
) -> PendingReservation {
    let now = clock.now();
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

fn purchase_for(event_id: EventId, quantity: u32, user: Option<UserId>) -> ConfirmedPurchase {
    ConfirmedPurchase {
        id: PurchaseId::new(),
        event_id,
        customer_name: "Ada".into(),
        customer_email: "ada@example.org".into(),
        quantity: TicketQuantity::new(quantity).unwrap(),
        purchase_date: Utc::now(),
        linked_user_id: user,
    }
}

#[tokio::test]
async fn dead_on_arrival_put_is_refused() {
    let clock = ManualClock::new(Utc::now());
    let store = InMemoryReservationStore::with_clock(Arc::new(clock.clone()));
    let event_id = EventId::new();

    let mut reservation = reservation_at(&clock, event_id, 2, Duration::minutes(15));
    reservation.expires_at = reservation.created_at;

    let result = store.put(&reservation).await;
    assert_eq!(result, Err(ReservationError::AlreadyExpired));
    assert!(store.is_empty());
}

#[tokio::test]
async fn expired_records_stop_counting_but_stay_fetchable_until_swept() {
    let clock = ManualClock::new(Utc::now());
    let store = InMemoryReservationStore::with_clock(Arc::new(clock.clone()));
    let event_id = EventId::new();

    let reservation = reservation_at(&clock, event_id, 4, Duration::minutes(5));
    store.put(&reservation).await.unwrap();
    assert_eq!(store.count_active_for_event(event_id).await.unwrap(), 4);

    clock.advance(Duration::minutes(6));

    // Lazy expiry: invisible to the count, still present for the engine's
    // expired-vs-missing distinction.
    assert_eq!(store.count_active_for_event(event_id).await.unwrap(), 0);
    assert!(store.get(reservation.id).await.unwrap().is_some());

    assert_eq!(store.sweep_expired(), 1);
    assert_eq!(store.get(reservation.id).await.unwrap(), None);
}

#[tokio::test]
async fn count_is_scoped_per_event() {
    let clock = ManualClock::new(Utc::now());
    let store = InMemoryReservationStore::with_clock(Arc::new(clock.clone()));
    let event_id = EventId::new();
    let other_event = EventId::new();

    store
        .put(&reservation_at(&clock, event_id, 3, Duration::minutes(5)))
        .await
        .unwrap();
    store
        .put(&reservation_at(&clock, other_event, 7, Duration::minutes(5)))
        .await
        .unwrap();

    assert_eq!(store.count_active_for_event(event_id).await.unwrap(), 3);
    assert_eq!(store.count_active_for_event(other_event).await.unwrap(), 7);
}

#[tokio::test]
async fn ledger_rejects_duplicate_purchase_ids() {
    let ledger = InMemoryPurchaseLedger::new();
    let purchase = purchase_for(EventId::new(), 2, None);

    ledger.append(&purchase).await.unwrap();

    let retry = ledger.append(&purchase).await;
    assert_eq!(retry, Err(ReservationError::DuplicatePurchase(purchase.id)));
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.count_for_event(purchase.event_id).await.unwrap(), 2);
}

#[tokio::test]
async fn ledger_lists_newest_first_per_user_and_event() {
    let ledger = InMemoryPurchaseLedger::new();
    let event_id = EventId::new();
    let user_id = UserId::new();

    let first = purchase_for(event_id, 1, Some(user_id));
    let second = purchase_for(event_id, 2, Some(user_id));
    let unlinked = purchase_for(event_id, 5, None);
    ledger.append(&first).await.unwrap();
    ledger.append(&second).await.unwrap();
    ledger.append(&unlinked).await.unwrap();

    let for_user = ledger.list_for_user(user_id).await.unwrap();
    assert_eq!(
        for_user.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    let for_event = ledger.list_for_event(event_id).await.unwrap();
    assert_eq!(for_event.len(), 3);
    assert_eq!(for_event[0].id, unlinked.id);
}
