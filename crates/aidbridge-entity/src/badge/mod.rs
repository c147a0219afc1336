//! Badge tier table.

pub mod tier;

pub use tier::{BadgeTable, BadgeTier};
