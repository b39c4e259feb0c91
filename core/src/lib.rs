//! Tessera core - the ticket reservation engine.
//!
//! This crate decides whether a request to buy N tickets for an event may
//! proceed, holds that decision as a time-bounded pending reservation, and
//! later either commits it as a permanent purchase or releases it. It is
//! the one place in the surrounding catalog/ticketing backend where
//! concurrent requests contend over capacity-bounded inventory, and where
//! two stores (an ephemeral reservation store and a durable purchase
//! ledger) must be coordinated without overselling.
//!
//! # Architecture
//!
//! ```text
//!                ┌─────────────────────────┐
//!  caller ─────▶ │    ReservationEngine    │
//!                │  (admission + lifecycle)│
//!                └───────────┬─────────────┘
//!            ┌───────────────┼───────────────────┐
//!            ▼               ▼                   ▼
//!  EventCapacitySource  PendingReservationStore  ConfirmedPurchaseLedger
//!     (catalog, RO)       (ephemeral, TTL)          (durable, append-only)
//! ```
//!
//! Per reservation the lifecycle is
//! `Created → {Confirmed, Cancelled, Expired}`; all three terminal states
//! are absorbing, and only `Confirmed` writes the ledger.
//!
//! Store backends live in sibling crates (`tessera-redis`,
//! `tessera-postgres`); deterministic in-memory implementations for tests
//! live in `tessera-testing`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use config::{Config, PostgresConfig, RedisConfig, ReservationConfig};
pub use engine::ReservationEngine;
pub use error::{ReservationError, Result};
pub use store::{ConfirmedPurchaseLedger, EventCapacitySource, PendingReservationStore};
pub use types::{
    Capacity, ConfirmedPurchase, CustomerContact, EventId, Identity, PendingReservation,
    PurchaseId, ReservationId, TicketQuantity, UserId,
};
