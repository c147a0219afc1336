//! Donation pickup logistics entities.

pub mod model;
pub mod status;

pub use model::PickupEvent;
pub use status::PickupStatus;
