//! # aidbridge-core
//!
//! Core crate for AidBridge. Contains configuration schemas, typed
//! identifiers, geo and pagination types, the push transport trait,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other AidBridge crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
