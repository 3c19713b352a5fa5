//! # casehub-database
//!
//! PostgreSQL connection management and the case repository, with an
//! in-memory implementation used by tests and by `database.url = "memory"`.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{CaseRepository, MemoryCaseRepository, PgCaseRepository};
