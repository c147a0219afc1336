//! Fire-and-forget push delivery to responders.

pub mod dispatcher;
pub mod transport;

pub use dispatcher::PushDispatcher;
pub use transport::{LogTransport, WebhookTransport, build_transport};
