//! Handling ticket domain entities.

pub mod feedback;
pub mod model;
pub mod scheduling;
pub mod status;

pub use feedback::Feedback;
pub use model::HandlingTicket;
pub use scheduling::{ScheduleRequest, SchedulingDetail};
pub use status::TicketStatus;
