//! Responder registry.

pub mod service;

pub use service::ResponderService;
