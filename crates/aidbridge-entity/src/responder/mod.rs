//! Responder organization entities.

pub mod model;

pub use model::{CreateResponder, Responder};
