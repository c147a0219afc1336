//! Need / offer domain entities.

pub mod model;
pub mod status;

pub use model::{CreateNeed, Need, NeedKind};
pub use status::{AggregateStatus, is_fully_closed};
