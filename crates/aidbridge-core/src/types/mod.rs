//! Core type definitions used across the AidBridge workspace.

pub mod geo;
pub mod id;
pub mod pagination;

pub use geo::GeoPoint;
pub use id::*;
pub use pagination::{PageRequest, PageResponse};
