//! Query execution core for a document store.
//!
//! [`Executor`] runs delete, update and query operations against any [`StorageManager`]:
//! compile the pattern, scan the namespace, act on matches. Query results come back as a
//! wire-format [`Reply`].

pub mod cli;
pub mod config;
pub mod document;
pub mod errors;
pub mod exec;
pub mod logger;
pub mod query;
pub mod reply;
pub mod storage;
pub mod telemetry;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use document::Document;
pub use errors::DbError;
pub use exec::Executor;
pub use reply::{Reply, ReplyHeader};
pub use storage::{MemoryStorage, StorageManager, WalStorage};
pub use types::{RecordHandle, UpdateOutcome};

/// Opens the storage named by `cfg` (a `WalStorage` when `db_path` is set, otherwise in-memory)
/// and wraps it in an executor.
///
/// # Errors
/// Propagates failures opening or replaying the log.
pub fn open(cfg: &EngineConfig) -> Result<Executor, DbError> {
    let storage: std::sync::Arc<dyn StorageManager> = match &cfg.db_path {
        Some(path) => std::sync::Arc::new(WalStorage::open_with(path, cfg.sync_on_write)?),
        None => std::sync::Arc::new(MemoryStorage::new()),
    };
    Ok(Executor::with_config(storage, cfg))
}
