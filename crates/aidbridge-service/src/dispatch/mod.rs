//! Fan-out of a need to chosen responders.

pub mod service;

pub use service::{DispatchOutcome, DispatchService};
