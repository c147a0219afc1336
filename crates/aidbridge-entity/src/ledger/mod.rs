//! Activity ledger entities.

pub mod model;

pub use model::{ActorType, LedgerEntry, NewLedgerEntry};
