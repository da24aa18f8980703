//! [`PersistenceGateway`](tutorhub_core::gateway::PersistenceGateway)
//! implementations.

pub mod memory;
pub mod pg;
pub mod sql;

pub use memory::MemoryGateway;
pub use pg::PgGateway;
