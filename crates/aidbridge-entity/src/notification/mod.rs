//! Responder inbox entities.

pub mod model;
pub mod status;

pub use model::NotificationRecord;
pub use status::InboxStatus;
