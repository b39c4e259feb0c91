//! # Tessera Testing
//!
//! Testing utilities for the ticket reservation engine:
//!
//! - In-memory implementations of the engine's store traits
//! - Deterministic clocks (fixed and advanceable)
//! - A static capacity source standing in for the catalog service
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use std::sync::Arc;
//! use tessera_core::{Capacity, CustomerContact, EventId, ReservationEngine};
//! use tessera_testing::{
//!     InMemoryPurchaseLedger, InMemoryReservationStore, ManualClock, StaticCapacitySource,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let clock = ManualClock::new(Utc::now());
//! let catalog = StaticCapacitySource::new();
//! let event_id = EventId::new();
//! catalog.publish(event_id, Capacity::new(10));
//!
//! let engine = ReservationEngine::new(
//!     InMemoryReservationStore::with_clock(Arc::new(clock.clone())),
//!     InMemoryPurchaseLedger::new(),
//!     catalog,
//!     clock,
//!     Duration::minutes(15),
//! );
//!
//! let contact = CustomerContact {
//!     name: "Ada".into(),
//!     email: "ada@example.org".into(),
//! };
//! let reservation = engine
//!     .buy_ticket(event_id, 2, Some(contact), None)
//!     .await
//!     .unwrap();
//! assert_eq!(reservation.quantity.get(), 2);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clocks;
mod stores;

pub use clocks::{FixedClock, ManualClock};
pub use stores::{InMemoryPurchaseLedger, InMemoryReservationStore, StaticCapacitySource};
