//! Donation pickup logistics.

pub mod service;

pub use service::PickupService;
