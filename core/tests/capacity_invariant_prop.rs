//! Property test: the capacity invariant survives arbitrary operation
//! sequences.
//!
//! For any interleaving of buys, confirms, cancels, and clock advances
//! against one event, at every step:
//!
//! ```text
//! confirmed quantity + active pending quantity ≤ capacity
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::{Duration, Utc};
use proptest::prelude::*;
use std::sync::Arc;
use tessera_core::{
    Capacity, CustomerContact, EventId, PendingReservationStore, ReservationEngine,
    ReservationError, ReservationId,
};
use tessera_testing::{
    InMemoryPurchaseLedger, InMemoryReservationStore, ManualClock, StaticCapacitySource,
};

const CAPACITY: u32 = 10;
const WINDOW_MINUTES: i64 = 15;

#[derive(Clone, Debug)]
enum Op {
    /// Attempt a purchase of 1..=4 tickets.
    Buy(u32),
    /// Confirm one of the previously issued reservation ids.
    Confirm(prop::sample::Index),
    /// Cancel one of the previously issued reservation ids.
    Cancel(prop::sample::Index),
    /// Let 0..=20 minutes pass.
    Advance(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1u32..=4).prop_map(Op::Buy),
        2 => any::<prop::sample::Index>().prop_map(Op::Confirm),
        2 => any::<prop::sample::Index>().prop_map(Op::Cancel),
        1 => (0i64..=20).prop_map(Op::Advance),
    ]
}

fn pick(issued: &[ReservationId], index: prop::sample::Index) -> Option<ReservationId> {
    if issued.is_empty() {
        None
    } else {
        Some(issued[index.index(issued.len())])
    }
}

async fn run_sequence(ops: Vec<Op>) {
    let clock = ManualClock::new(Utc::now());
    let store = InMemoryReservationStore::with_clock(Arc::new(clock.clone()));
    let ledger = InMemoryPurchaseLedger::new();
    let catalog = StaticCapacitySource::new();
    let event_id = EventId::new();
    catalog.publish(event_id, Capacity::new(CAPACITY));

    let engine = ReservationEngine::new(
        store.clone(),
        ledger.clone(),
        catalog,
        clock.clone(),
        Duration::minutes(WINDOW_MINUTES),
    );

    let contact = CustomerContact {
        name: "Ada".into(),
        email: "ada@example.org".into(),
    };

    let mut issued: Vec<ReservationId> = Vec::new();

    for op in ops {
        match op {
            Op::Buy(quantity) => {
                match engine
                    .buy_ticket(event_id, quantity, Some(contact.clone()), None)
                    .await
                {
                    Ok(reservation) => issued.push(reservation.id),
                    Err(ReservationError::NoFreeTickets { .. }) => {}
                    Err(other) => panic!("unexpected buy error: {other}"),
                }
            }
            Op::Confirm(index) => {
                if let Some(id) = pick(&issued, index) {
                    match engine.confirm_buy_ticket(id).await {
                        Ok(_)
                        | Err(
                            ReservationError::ReservationNotFound
                            | ReservationError::ReservationExpired,
                        ) => {}
                        Err(other) => panic!("unexpected confirm error: {other}"),
                    }
                }
            }
            Op::Cancel(index) => {
                if let Some(id) = pick(&issued, index) {
                    engine.cancel_buy_ticket(id).await.unwrap();
                }
            }
            Op::Advance(minutes) => clock.advance(Duration::minutes(minutes)),
        }

        let confirmed = ledger.purchased_total(event_id);
        let pending = u64::from(store.count_active_for_event(event_id).await.unwrap());
        assert!(
            confirmed + pending <= u64::from(CAPACITY),
            "invariant violated: confirmed {confirmed} + pending {pending} > {CAPACITY}"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn capacity_invariant_holds(ops in prop::collection::vec(op_strategy(), 1..48)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run_sequence(ops));
    }
}
