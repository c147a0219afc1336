//! Responder inbox.

pub mod service;

pub use service::InboxService;
