//! TutorHub marketplace HTTP service.
//!
//! `main.rs` wires configuration, storage and the router from here; the
//! integration tests under `tests/` build the same router over the
//! in-memory gateway.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod wizard_registry;
