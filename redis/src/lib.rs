//! Redis adapter for the pending reservation store.
//!
//! Implements `tessera_core::PendingReservationStore` over Redis with
//! per-key TTL expiry, so abandoned reservations release their capacity
//! without any engine-side sweep. See [`RedisReservationStore`] for the
//! key layout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod store;

pub use store::RedisReservationStore;
