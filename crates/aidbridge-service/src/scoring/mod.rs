//! Points and badges derived from the activity ledger.

pub mod engine;

pub use engine::{Score, ScoringEngine};
