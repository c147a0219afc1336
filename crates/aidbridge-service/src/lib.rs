//! # aidbridge-service
//!
//! Workflow services for AidBridge. Each service orchestrates the entity
//! stores to implement one group of use cases: need registration, dispatch
//! fan-out, the per-ticket state machine, scheduling, requester
//! confirmation and feedback, pickup logistics, the responder inbox,
//! scoring, and push delivery.
//!
//! Services follow constructor injection: every dependency is provided at
//! construction time and the services are cheap to clone.

pub mod context;
pub mod dispatch;
pub mod inbox;
mod lookup;
pub mod need;
pub mod pickup;
pub mod push;
pub mod responder;
pub mod scoring;
pub mod ticket;

pub use context::RequestContext;
pub use dispatch::{DispatchOutcome, DispatchService};
pub use inbox::InboxService;
pub use need::{NeedService, NeedSummary, NeedView};
pub use pickup::PickupService;
pub use push::{PushDispatcher, build_transport};
pub use responder::ResponderService;
pub use scoring::{Score, ScoringEngine};
pub use ticket::{
    ConfirmationService, ScheduledTicket, SchedulingService, TicketService, TicketView,
};
