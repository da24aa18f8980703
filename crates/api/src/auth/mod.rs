//! Authentication primitives.
//!
//! Sign-up, login and token issuance belong to the hosted auth provider.
//! This service only validates the bearer tokens it issues.
//!
//! - [`jwt`] -- HS256 access-token validation (and generation, for tests and tooling).

pub mod jwt;
