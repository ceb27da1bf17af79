//! Scan / match / act orchestration.
//!
//! Every operation follows the same shape: compile the pattern once, open a full scan, step the
//! cursor with [`visit_and_advance`](crate::storage::visit_and_advance), then either mutate
//! through the captured handle or collect the document. Loops end `Exhausted` or
//! `TerminatedEarly` (delete-one hit, update hit, result cap).

mod mutate;
mod query;

use crate::config::EngineConfig;
use crate::errors::DbError;
use crate::storage::StorageManager;
use crate::telemetry::{ExecEvent, ExecObserver, Telemetry};
use crate::types::{OpKind, is_reserved};
use std::sync::Arc;

pub struct Executor {
    storage: Arc<dyn StorageManager>,
    observer: Arc<dyn ExecObserver>,
    reserved_prefix: String,
}

impl Executor {
    /// Executor with default configuration and a fresh [`Telemetry`] observer.
    pub fn new(storage: Arc<dyn StorageManager>) -> Self {
        Self::with_config(storage, &EngineConfig::default())
    }

    pub fn with_config(storage: Arc<dyn StorageManager>, cfg: &EngineConfig) -> Self {
        Self {
            storage,
            observer: Arc::new(Telemetry::new()),
            reserved_prefix: cfg.reserved_prefix.clone(),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ExecObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageManager> {
        &self.storage
    }

    #[must_use]
    pub fn reserved_prefix(&self) -> &str {
        &self.reserved_prefix
    }

    fn emit(&self, event: ExecEvent<'_>) {
        self.observer.on_event(&event);
    }

    /// Namespace guard shared by delete and update.
    fn guard(&self, op: OpKind, ns: &str) -> Result<(), DbError> {
        if is_reserved(ns, &self.reserved_prefix) {
            self.emit(ExecEvent::GuardRejected { op, ns });
            return Err(DbError::PermissionDenied(format!("{} in reserved namespace {ns}", op.as_str())));
        }
        Ok(())
    }
}
