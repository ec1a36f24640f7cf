//! # portal-database
//!
//! PostgreSQL connection management, migrations, and the transactional
//! store used by every service operation. An in-memory store with the
//! same semantics backs tests and the `memory` provider.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::memory::MemoryStore;
pub use store::postgres::PgStore;
pub use store::{PortalStore, StoreTx};
