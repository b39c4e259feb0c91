//! `PostgreSQL` adapter for the confirmed purchase ledger.
//!
//! Implements `tessera_core::ConfirmedPurchaseLedger` over a durable
//! `confirmed_purchases` table, indexed by event and by linked user. See
//! the `migrations/` directory for the schema.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ledger;

pub use ledger::PostgresPurchaseLedger;
