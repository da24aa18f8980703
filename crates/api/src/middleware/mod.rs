//! Request extractors for caller identity.
//!
//! Handlers take [`auth::AuthUser`] for any signed-in caller and
//! [`rbac::RequireAdmin`] for platform-admin operations such as pricing.

pub mod auth;
pub mod rbac;
