//! Domain types for the ticket reservation engine.
//!
//! Value objects and records shared by the engine and its store adapters:
//! identifiers, quantities, the pending reservation held while a purchase is
//! in flight, and the confirmed purchase that outlives it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a pending reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random `ReservationId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ReservationId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a confirmed purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseId(Uuid);

impl PurchaseId {
    /// Creates a new random `PurchaseId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `PurchaseId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PurchaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a registered user, as resolved by the auth layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Capacity and Quantity
// ============================================================================

/// Total ticket capacity of an event, as published by the catalog.
///
/// Read-only from the engine's perspective; capacity changes after
/// publication are handled outside the reservation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capacity(u32);

impl Capacity {
    /// Creates a new `Capacity`.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive number of tickets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketQuantity(u32);

impl TicketQuantity {
    /// Creates a `TicketQuantity`, rejecting zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    /// Returns the quantity value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TicketQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Customer data
// ============================================================================

/// Contact details supplied explicitly by an anonymous buyer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    /// Buyer's display name.
    pub name: String,
    /// Buyer's email address.
    pub email: String,
}

/// A caller identity resolved by the authentication middleware.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The registered user this identity belongs to.
    pub user_id: UserId,
    /// Name on the account.
    pub name: String,
    /// Email on the account.
    pub email: String,
}

// ============================================================================
// Reservation lifecycle records
// ============================================================================

/// A time-bounded hold on event tickets, awaiting confirmation.
///
/// Created by `buy_ticket`, never mutated (replace-on-write only), and
/// destroyed by confirm, cancel, or passive TTL expiry in the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// Event the tickets are held for.
    pub event_id: EventId,
    /// Buyer's name.
    pub customer_name: String,
    /// Buyer's email address.
    pub customer_email: String,
    /// Number of tickets held.
    pub quantity: TicketQuantity,
    /// Registered user behind the reservation, when one was resolved.
    pub created_by: Option<UserId>,
    /// When the hold was taken.
    pub created_at: DateTime<Utc>,
    /// Deadline after which the hold no longer counts against capacity.
    pub expires_at: DateTime<Utc>,
}

impl PendingReservation {
    /// Whether the reservation's deadline has passed at `now`.
    ///
    /// A reservation is still active at the exact deadline instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Remaining lifetime at `now`; negative once expired.
    #[must_use]
    pub fn ttl_from(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.expires_at.signed_duration_since(now)
    }
}

/// A finalized ticket purchase.
///
/// Created only when a pending reservation is confirmed, carrying the same
/// quantity. Never mutated or deleted by the engine (audit trail).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedPurchase {
    /// Unique purchase identifier.
    pub id: PurchaseId,
    /// Event the tickets were purchased for.
    pub event_id: EventId,
    /// Buyer's name.
    pub customer_name: String,
    /// Buyer's email address.
    pub customer_email: String,
    /// Number of tickets purchased.
    pub quantity: TicketQuantity,
    /// When the purchase was finalized.
    pub purchase_date: DateTime<Utc>,
    /// Registered user the purchase is linked to, when one was resolved.
    pub linked_user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ticket_quantity_rejects_zero() {
        assert!(TicketQuantity::new(0).is_none());
        assert_eq!(TicketQuantity::new(3).map(|q| q.get()), Some(3));
    }

    #[test]
    fn reservation_active_at_exact_deadline() {
        let now = Utc::now();
        let reservation = PendingReservation {
            id: ReservationId::new(),
            event_id: EventId::new(),
            customer_name: "Ada".into(),
            customer_email: "ada@example.org".into(),
            quantity: TicketQuantity(2),
            created_by: None,
            created_at: now,
            expires_at: now + Duration::minutes(15),
        };

        assert!(!reservation.is_expired(now));
        assert!(!reservation.is_expired(reservation.expires_at));
        assert!(reservation.is_expired(reservation.expires_at + Duration::seconds(1)));
        assert_eq!(reservation.ttl_from(now), Duration::minutes(15));
    }
}
