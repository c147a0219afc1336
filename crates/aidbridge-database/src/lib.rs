//! # aidbridge-database
//!
//! Persistence for AidBridge. [`store`] defines one async trait per entity
//! and a [`Store`] bundle of trait objects; [`repositories`] implements them
//! on PostgreSQL and [`store::memory`] implements them in process.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::Store;
