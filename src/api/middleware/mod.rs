//! HTTP middleware for request processing and protection.
//!
//! Provides authentication, role restriction, and observability middleware.

pub mod auth;
pub mod tracing;
