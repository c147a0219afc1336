//! # aidbridge-api
//!
//! HTTP API layer for AidBridge built on Axum.
//!
//! Provides the REST endpoints, the actor extractor fed by the upstream
//! authentication gateway, request logging and CORS middleware, DTOs, and
//! the mapping from [`AppError`](aidbridge_core::AppError) kinds to HTTP
//! status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
