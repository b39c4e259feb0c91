//! In-memory store implementations.
//!
//! These back the engine in tests the way the production Redis/Postgres
//! adapters do in deployment, with two deliberate differences: expiry is
//! lazy (expired records stay readable until [`sweep_expired`] runs, so
//! tests can exercise the expired-vs-missing distinction), and time comes
//! from an injected [`Clock`] so windows can be simulated.
//!
//! [`sweep_expired`]: InMemoryReservationStore::sweep_expired

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tessera_core::{
    Capacity, Clock, ConfirmedPurchase, ConfirmedPurchaseLedger, EventCapacitySource, EventId,
    PendingReservation, PendingReservationStore, ReservationError, ReservationId, Result,
    SystemClock, UserId,
};

/// In-memory pending reservation store.
///
/// Uses lazy expiry: records past their deadline stop counting toward
/// [`count_active_for_event`] immediately but remain fetchable until
/// swept, mirroring a store whose reaper has not run yet.
///
/// [`count_active_for_event`]: PendingReservationStore::count_active_for_event
#[derive(Clone)]
pub struct InMemoryReservationStore {
    entries: Arc<Mutex<HashMap<ReservationId, PendingReservation>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryReservationStore {
    /// Create a store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store on an injected clock (usually a
    /// [`crate::ManualClock`] shared with the engine under test).
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of records currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physically remove expired records, emulating the store's reaper.
    ///
    /// Returns the number of records removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, r| !r.is_expired(now));
        before - entries.len()
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingReservationStore for InMemoryReservationStore {
    async fn put(&self, reservation: &PendingReservation) -> Result<()> {
        if reservation.ttl_from(self.clock.now()) <= chrono::Duration::zero() {
            return Err(ReservationError::AlreadyExpired);
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn get(&self, reservation_id: ReservationId) -> Result<Option<PendingReservation>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&reservation_id)
            .cloned())
    }

    async fn delete(&self, reservation_id: ReservationId) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&reservation_id);
        Ok(())
    }

    async fn count_active_for_event(&self, event_id: EventId) -> Result<u32> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let total = entries
            .values()
            .filter(|r| r.event_id == event_id && !r.is_expired(now))
            .map(|r| u64::from(r.quantity.get()))
            .sum::<u64>();
        Ok(u32::try_from(total).unwrap_or(u32::MAX))
    }
}

/// In-memory confirmed purchase ledger.
#[derive(Clone, Default)]
pub struct InMemoryPurchaseLedger {
    entries: Arc<Mutex<Vec<ConfirmedPurchase>>>,
}

impl InMemoryPurchaseLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of purchases appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no purchases were appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synchronous total of purchased quantities for an event, for
    /// invariant assertions.
    #[must_use]
    pub fn purchased_total(&self, event_id: EventId) -> u64 {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|p| p.event_id == event_id)
            .map(|p| u64::from(p.quantity.get()))
            .sum()
    }
}

impl ConfirmedPurchaseLedger for InMemoryPurchaseLedger {
    async fn count_for_event(&self, event_id: EventId) -> Result<u32> {
        Ok(u32::try_from(self.purchased_total(event_id)).unwrap_or(u32::MAX))
    }

    async fn append(&self, purchase: &ConfirmedPurchase) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|p| p.id == purchase.id) {
            return Err(ReservationError::DuplicatePurchase(purchase.id));
        }
        entries.push(purchase.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ConfirmedPurchase>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // Appends happen in purchase order; newest first means reversed.
        Ok(entries
            .iter()
            .rev()
            .filter(|p| p.linked_user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<ConfirmedPurchase>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .iter()
            .rev()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }
}

/// Capacity source over a fixed table of published events.
#[derive(Clone, Default)]
pub struct StaticCapacitySource {
    capacities: Arc<Mutex<HashMap<EventId, Capacity>>>,
}

impl StaticCapacitySource {
    /// Create an empty source (every event is unknown).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event with the given capacity.
    pub fn publish(&self, event_id: EventId, capacity: Capacity) {
        self.capacities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event_id, capacity);
    }
}

impl EventCapacitySource for StaticCapacitySource {
    async fn capacity_for(&self, event_id: EventId) -> Result<Option<Capacity>> {
        Ok(self
            .capacities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_id)
            .copied())
    }
}
