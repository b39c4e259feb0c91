//! The reservation engine: admission control and the
//! reserve → confirm/cancel/expire state machine.
//!
//! The engine is the only component with business logic. It coordinates the
//! pending reservation store and the confirmed purchase ledger so that, for
//! every event, at every instant:
//!
//! ```text
//! confirmed quantity + active pending quantity ≤ capacity
//! ```
//!
//! Reads of the two stores plus the reservation write are not atomic on
//! their own, so admission for an event is serialized behind a per-event
//! lock held across the count-and-write sequence, and confirmation holds
//! the same lock across its append-then-delete sequence. Cancellation only
//! frees capacity and takes no lock.

use crate::clock::Clock;
use crate::error::{ReservationError, Result};
use crate::store::{ConfirmedPurchaseLedger, EventCapacitySource, PendingReservationStore};
use crate::types::{
    ConfirmedPurchase, CustomerContact, EventId, Identity, PendingReservation, PurchaseId,
    ReservationId, TicketQuantity, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Orchestrates ticket reservations over injected store handles.
///
/// Holds no mutable state besides the per-event admission locks, so it can
/// be shared freely across request-handling tasks.
///
/// # Example
///
/// ```no_run
/// use tessera_core::{Config, ReservationEngine, SystemClock};
/// # use tessera_core::Result;
/// # use tessera_core::store::{ConfirmedPurchaseLedger, EventCapacitySource,
/// #     PendingReservationStore};
/// # async fn example<S, L, C>(pending: S, ledger: L, catalog: C) -> Result<()>
/// # where
/// #     S: PendingReservationStore,
/// #     L: ConfirmedPurchaseLedger,
/// #     C: EventCapacitySource,
/// # {
/// let config = Config::from_env();
/// let engine = ReservationEngine::new(
///     pending,
///     ledger,
///     catalog,
///     SystemClock,
///     config.reservation.window(),
/// );
/// # Ok(())
/// # }
/// ```
pub struct ReservationEngine<S, L, C, K> {
    pending: S,
    ledger: L,
    catalog: C,
    clock: K,
    window: chrono::Duration,
    /// One admission lock per event, created on first contact.
    admission_locks: Mutex<HashMap<EventId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S, L, C, K> ReservationEngine<S, L, C, K>
where
    S: PendingReservationStore,
    L: ConfirmedPurchaseLedger,
    C: EventCapacitySource,
    K: Clock,
{
    /// Create an engine over explicit store handles.
    ///
    /// `window` is the reservation window: how long a pending reservation
    /// holds capacity before passive expiry.
    pub fn new(pending: S, ledger: L, catalog: C, clock: K, window: chrono::Duration) -> Self {
        Self {
            pending,
            ledger,
            catalog,
            clock,
            window,
            admission_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The configured reservation window.
    ///
    /// Callers use this to set cookie/response expiry hints consistent
    /// with the store's TTL.
    #[must_use]
    pub const fn reservation_window(&self) -> chrono::Duration {
        self.window
    }

    /// Request a hold on `requested` tickets for an event.
    ///
    /// Customer data comes from the resolved `identity` when present,
    /// otherwise from the explicit `contact`. On success the returned
    /// reservation holds capacity until `expires_at`, when the store
    /// reclaims it passively unless it is confirmed or cancelled first.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::InvalidQuantity`] — `requested` is zero
    /// - [`ReservationError::NoCustomerData`] — neither identity nor contact
    /// - [`ReservationError::UnknownEvent`] — event not in the catalog
    /// - [`ReservationError::NoFreeTickets`] — admission would violate the
    ///   capacity invariant
    /// - Infrastructure errors from either store, propagated as-is
    #[tracing::instrument(skip(self, contact, identity), fields(event_id = %event_id))]
    pub async fn buy_ticket(
        &self,
        event_id: EventId,
        requested: u32,
        contact: Option<CustomerContact>,
        identity: Option<&Identity>,
    ) -> Result<PendingReservation> {
        let quantity =
            TicketQuantity::new(requested).ok_or(ReservationError::InvalidQuantity)?;
        let (customer_name, customer_email, created_by) = resolve_customer(contact, identity)?;

        let capacity = self
            .catalog
            .capacity_for(event_id)
            .await?
            .ok_or(ReservationError::UnknownEvent(event_id))?;

        let lock = self.admission_lock(event_id);
        let _guard = lock.lock().await;

        let confirmed = self.ledger.count_for_event(event_id).await?;
        let pending = self.pending.count_active_for_event(event_id).await?;
        let available = capacity
            .value()
            .saturating_sub(confirmed.saturating_add(pending));

        if quantity.get() > available {
            metrics::counter!("reservations.rejected").increment(1);
            tracing::debug!(
                requested = quantity.get(),
                confirmed,
                pending,
                capacity = capacity.value(),
                "admission rejected"
            );
            return Err(ReservationError::NoFreeTickets {
                event_id,
                requested: quantity.get(),
                available,
            });
        }

        let now = self.clock.now();
        let reservation = PendingReservation {
            id: ReservationId::new(),
            event_id,
            customer_name,
            customer_email,
            quantity,
            created_by,
            created_at: now,
            expires_at: now + self.window,
        };
        self.pending.put(&reservation).await?;

        metrics::counter!("reservations.created").increment(1);
        tracing::info!(
            reservation_id = %reservation.id,
            quantity = quantity.get(),
            expires_at = %reservation.expires_at,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Finalize a pending reservation into a confirmed purchase.
    ///
    /// Appends the purchase to the ledger, then deletes the pending entry.
    /// If the delete fails after a successful append, the error propagates
    /// and the orphaned entry self-heals via TTL: admission only ever sums
    /// *active* pending, so the double-count is bounded by the window.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::ReservationNotFound`] — unknown or
    ///   already-finalized id (a second confirm lands here)
    /// - [`ReservationError::ReservationExpired`] — deadline passed, even
    ///   if the record is still physically present
    /// - [`ReservationError::DuplicatePurchase`] — ledger id collision on a
    ///   retried confirm
    /// - Infrastructure errors from either store, propagated as-is
    #[tracing::instrument(skip(self), fields(reservation_id = %reservation_id))]
    pub async fn confirm_buy_ticket(
        &self,
        reservation_id: ReservationId,
    ) -> Result<ConfirmedPurchase> {
        // First read only locates the event so the right lock can be taken.
        let probe = self
            .pending
            .get(reservation_id)
            .await?
            .ok_or(ReservationError::ReservationNotFound)?;

        let lock = self.admission_lock(probe.event_id);
        let _guard = lock.lock().await;

        // Re-read under the lock: a racing confirm or cancel may have
        // finalized the entry in the meantime.
        let reservation = self
            .pending
            .get(reservation_id)
            .await?
            .ok_or(ReservationError::ReservationNotFound)?;

        if reservation.is_expired(self.clock.now()) {
            tracing::debug!(expires_at = %reservation.expires_at, "confirm on expired reservation");
            return Err(ReservationError::ReservationExpired);
        }

        let purchase = ConfirmedPurchase {
            id: PurchaseId::new(),
            event_id: reservation.event_id,
            customer_name: reservation.customer_name.clone(),
            customer_email: reservation.customer_email.clone(),
            quantity: reservation.quantity,
            purchase_date: self.clock.now(),
            linked_user_id: reservation.created_by,
        };
        self.ledger.append(&purchase).await?;
        self.pending.delete(reservation_id).await?;

        metrics::counter!("reservations.confirmed").increment(1);
        tracing::info!(
            purchase_id = %purchase.id,
            event_id = %purchase.event_id,
            quantity = purchase.quantity.get(),
            "reservation confirmed"
        );
        Ok(purchase)
    }

    /// Release a pending reservation immediately.
    ///
    /// Idempotent: cancelling an unknown or already-finalized id is a
    /// no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns error only if the store is unreachable.
    #[tracing::instrument(skip(self), fields(reservation_id = %reservation_id))]
    pub async fn cancel_buy_ticket(&self, reservation_id: ReservationId) -> Result<()> {
        self.pending.delete(reservation_id).await?;
        metrics::counter!("reservations.cancelled").increment(1);
        tracing::info!("reservation cancelled");
        Ok(())
    }

    /// All confirmed purchases linked to the caller, newest first.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotAuthenticated`] — no resolved identity
    /// - Infrastructure errors from the ledger, propagated as-is
    pub async fn purchases_for_user(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<ConfirmedPurchase>> {
        let identity = identity.ok_or(ReservationError::NotAuthenticated)?;
        self.ledger.list_for_user(identity.user_id).await
    }

    /// Get or create the admission lock for an event.
    fn admission_lock(&self, event_id: EventId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .admission_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(event_id).or_default())
    }
}

/// Resolve customer name/email and linked user from the available sources.
/// A resolved identity wins over explicit contact details.
fn resolve_customer(
    contact: Option<CustomerContact>,
    identity: Option<&Identity>,
) -> Result<(String, String, Option<UserId>)> {
    match (identity, contact) {
        (Some(identity), _) => Ok((
            identity.name.clone(),
            identity.email.clone(),
            Some(identity.user_id),
        )),
        (None, Some(contact)) => Ok((contact.name, contact.email, None)),
        (None, None) => Err(ReservationError::NoCustomerData),
    }
}
