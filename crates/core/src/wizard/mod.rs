//! Institution signup wizard: typed step payloads, per-step field stores,
//! the shared step context and profile assembly.

pub mod assembler;
pub mod context;
pub mod form_store;
pub mod guard;
pub mod hydrate;
pub mod payload;
pub mod session;
pub mod steps;
