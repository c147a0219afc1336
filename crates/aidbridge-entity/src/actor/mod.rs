//! Actor roles passed explicitly with every workflow call.

pub mod role;

pub use role::ActorRole;
