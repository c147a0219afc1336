//! Ticket state machine, scheduling and requester confirmation.

pub mod confirmation;
pub mod scheduling;
pub mod service;
mod workflow;

pub use confirmation::ConfirmationService;
pub use scheduling::{ScheduledTicket, SchedulingService};
pub use service::{TicketService, TicketView};
