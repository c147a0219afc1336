//! # aidbridge-entity
//!
//! Domain entity models for AidBridge. Every struct in this crate is either
//! a persisted record (need, responder, ticket, notification record, pickup
//! event, ledger entry) or a value object used to build one. Workflow rules
//! that depend only on a single record's own fields (legal ticket edges,
//! pickup progression, badge derivation, aggregate status reduction) live
//! next to the record they govern.

pub mod actor;
pub mod badge;
pub mod ledger;
pub mod need;
pub mod notification;
pub mod pickup;
pub mod responder;
pub mod ticket;
