//! Traits defined in `aidbridge-core` and implemented by other crates.

pub mod push;

pub use push::{PushPayload, PushTransport};
