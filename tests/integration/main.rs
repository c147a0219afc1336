//! HTTP integration tests for AidBridge.
//!
//! Each test builds the full router over the in-memory store and drives it
//! with `tower::ServiceExt::oneshot`.

mod errors_test;
mod helpers;
mod inbox_test;
mod workflow_test;
