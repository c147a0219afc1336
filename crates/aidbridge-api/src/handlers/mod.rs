//! Route handlers organized by domain.

pub mod health;
pub mod inbox;
pub mod need;
pub mod pickup;
pub mod responder;
pub mod score;
pub mod ticket;
