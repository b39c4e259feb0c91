//! Error types for reservation operations.

use crate::types::{EventId, PurchaseId};
use thiserror::Error;

/// Result type alias for reservation operations.
pub type Result<T> = std::result::Result<T, ReservationError>;

/// Error taxonomy for the reservation engine and its stores.
///
/// Business errors are decisions, not failures: the engine never retries
/// them internally. Infrastructure errors propagate as-is and are
/// candidates for caller-side retry with backoff.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReservationError {
    // ═══════════════════════════════════════════════════════════
    // Admission Errors
    // ═══════════════════════════════════════════════════════════
    /// The capacity invariant would be violated by this request.
    #[error("no free tickets for event {event_id}: requested {requested}, available {available}")]
    NoFreeTickets {
        /// Event that was requested.
        event_id: EventId,
        /// Quantity that was requested.
        requested: u32,
        /// Quantity still available at decision time.
        available: u32,
    },

    /// The requested ticket quantity was zero.
    #[error("requested ticket quantity must be greater than zero")]
    InvalidQuantity,

    /// Neither a resolved identity nor explicit contact details were supplied.
    #[error("no customer data supplied")]
    NoCustomerData,

    /// The event does not exist in the catalog.
    #[error("unknown event {0}")]
    UnknownEvent(EventId),

    // ═══════════════════════════════════════════════════════════
    // Lifecycle Errors
    // ═══════════════════════════════════════════════════════════
    /// Confirm/cancel referenced an unknown or already-finalized reservation.
    #[error("reservation not found")]
    ReservationNotFound,

    /// Confirm referenced a reservation past its deadline.
    ///
    /// Surfaced distinctly from [`ReservationError::ReservationNotFound`]
    /// so callers can explain "too slow" vs "wrong id".
    #[error("reservation has expired")]
    ReservationExpired,

    /// A reservation was handed to the store already past its deadline.
    #[error("reservation is expired at creation")]
    AlreadyExpired,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════
    /// The operation requires a resolved caller identity.
    #[error("not authenticated")]
    NotAuthenticated,

    // ═══════════════════════════════════════════════════════════
    // Ledger Errors
    // ═══════════════════════════════════════════════════════════
    /// A purchase id was appended to the ledger twice.
    #[error("duplicate purchase id {0}")]
    DuplicatePurchase(PurchaseId),

    // ═══════════════════════════════════════════════════════════
    // Infrastructure Errors
    // ═══════════════════════════════════════════════════════════
    /// The pending reservation store is unreachable or misbehaving.
    #[error("reservation store error: {0}")]
    Store(String),

    /// The purchase ledger is unreachable or misbehaving.
    #[error("purchase ledger error: {0}")]
    Ledger(String),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ReservationError {
    /// Returns `true` if this error is a legitimate rejection the caller
    /// can correct (smaller quantity, valid contact data, valid id).
    ///
    /// # Examples
    ///
    /// ```
    /// # use tessera_core::ReservationError;
    /// assert!(ReservationError::NoCustomerData.is_user_error());
    /// assert!(!ReservationError::Store("connection reset".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NoFreeTickets { .. }
                | Self::InvalidQuantity
                | Self::NoCustomerData
                | Self::UnknownEvent(_)
                | Self::ReservationNotFound
                | Self::ReservationExpired
                | Self::NotAuthenticated
        )
    }

    /// Returns `true` if this error is infrastructural and the same request
    /// may succeed on retry with backoff.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tessera_core::ReservationError;
    /// assert!(ReservationError::Ledger("timeout".into()).is_retryable());
    /// assert!(!ReservationError::ReservationExpired.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Ledger(_))
    }
}
