//! Capability traits for the stores the engine coordinates.
//!
//! The engine holds no mutable state of its own; everything shared lives
//! behind these three narrow interfaces, constructed once at process
//! startup and injected into [`crate::engine::ReservationEngine`].

use crate::error::Result;
use crate::types::{
    Capacity, ConfirmedPurchase, EventId, PendingReservation, ReservationId, UserId,
};
use std::future::Future;

/// Ephemeral store of pending reservations with store-managed expiry.
///
/// Each record carries its own deadline; the store reclaims abandoned
/// reservations passively (per-key TTL), so no engine-side sweep exists.
pub trait PendingReservationStore: Send + Sync {
    /// Write a reservation with TTL = `expires_at - now`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The reservation is already past its deadline →
    ///   [`crate::ReservationError::AlreadyExpired`]
    /// - The store is unreachable → [`crate::ReservationError::Store`]
    fn put(
        &self,
        reservation: &PendingReservation,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a reservation by id.
    ///
    /// Returns the record as stored, including one whose deadline has
    /// passed but which the store still holds; the engine owns the
    /// expired-vs-missing distinction.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn get(
        &self,
        reservation_id: ReservationId,
    ) -> impl Future<Output = Result<Option<PendingReservation>>> + Send;

    /// Remove a reservation. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn delete(
        &self,
        reservation_id: ReservationId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Sum of quantities across currently-live reservations for an event.
    ///
    /// Entries past their deadline must not be counted, whether or not the
    /// store has physically reclaimed them yet; this is the mechanism that
    /// returns abandoned capacity without an explicit reaper.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn count_active_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<u32>> + Send;
}

/// Durable, append-only ledger of finalized purchases.
pub trait ConfirmedPurchaseLedger: Send + Sync {
    /// Sum of purchased quantities for an event. Confirmed purchases count
    /// permanently.
    ///
    /// # Errors
    ///
    /// Returns error if the ledger is unreachable.
    fn count_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<u32>> + Send;

    /// Append a new purchase.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The purchase id already exists →
    ///   [`crate::ReservationError::DuplicatePurchase`] (confirm may be
    ///   retried after a partial failure)
    /// - The ledger is unreachable → [`crate::ReservationError::Ledger`]
    fn append(
        &self,
        purchase: &ConfirmedPurchase,
    ) -> impl Future<Output = Result<()>> + Send;

    /// All purchases linked to a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the ledger is unreachable.
    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<ConfirmedPurchase>>> + Send;

    /// All purchases for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the ledger is unreachable.
    fn list_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<ConfirmedPurchase>>> + Send;
}

/// Read-only view of event existence and published capacity, owned by the
/// catalog service.
pub trait EventCapacitySource: Send + Sync {
    /// Ticket capacity of an event, or `None` if the event does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the catalog is unreachable.
    fn capacity_for(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Option<Capacity>>> + Send;
}
