//! Need and offer registration.

pub mod service;

pub use service::{NeedService, NeedSummary, NeedView};
