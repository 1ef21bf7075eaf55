//! # pt-db
//!
//! Entity store for Project Tracker.
//!
//! - [`Store`]: scoped read queries plus `begin()` for mutations
//! - [`StoreTransaction`]: row-locking write unit; dropped without `commit` it rolls back
//! - [`MemoryStore`]: in-process backend for tests and `TRACKER_STORE=memory`
//! - [`PgStore`]: PostgreSQL backend over a [`Database`] pool
//!
//! ## Example
//!
//! ```ignore
//! use pt_db::{Database, PgStore, Store};
//!
//! let db = Database::connect(&config.database).await?;
//! db.migrate().await?;
//! let store = PgStore::new(db);
//! let mut tx = store.begin().await?;
//! let task = tx.lock_task(task_id).await?;
//! ```

pub mod error;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod store;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::MemoryStore;
pub use pool::{Database, PoolStats};
pub use postgres::PgStore;
pub use store::{Store, StoreTransaction, WorkloadEntry};
