//! PostgreSQL implementations of the store traits.
//!
//! Each repository owns a `PgPool` and maps rows through a private `*Row`
//! struct so that entity types stay free of storage layout.

pub mod ledger;
pub mod need;
pub mod notification;
pub mod pickup;
pub mod responder;
pub mod ticket;

pub use ledger::LedgerRepository;
pub use need::NeedRepository;
pub use notification::NotificationRepository;
pub use pickup::PickupRepository;
pub use responder::ResponderRepository;
pub use ticket::TicketRepository;

use aidbridge_core::error::{AppError, ErrorKind};

/// Map a unique-constraint violation to `DuplicateAction`, anything else to `Database`.
pub(crate) fn unique_or_database(err: sqlx::Error, duplicate: String, context: &str) -> AppError {
    let is_unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if is_unique {
        AppError::duplicate_action(duplicate)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), err)
    }
}
