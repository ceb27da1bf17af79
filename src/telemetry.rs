//! Observer hook for the executor.
//!
//! The executor reports what it does at fixed points (start, guard rejection, match, mutation,
//! completion) through [`ExecObserver`]. Nothing in the executor's results depends on an
//! observer being installed; [`NoopObserver`] is a valid choice.

use crate::types::{OpKind, RecordHandle, ScanEnd};
use std::sync::atomic::{AtomicU64, Ordering};

pub const AUDIT_TARGET: &str = "docexec::audit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecEvent<'a> {
    Started { op: OpKind, ns: &'a str, pattern_len: usize },
    GuardRejected { op: OpKind, ns: &'a str },
    Matched { op: OpKind, ns: &'a str, handle: RecordHandle },
    Deleted { ns: &'a str, handle: RecordHandle },
    Updated { ns: &'a str, handle: RecordHandle },
    Inserted { ns: &'a str, handle: RecordHandle },
    Completed { op: OpKind, ns: &'a str, affected: usize, end: ScanEnd },
}

pub trait ExecObserver: Send + Sync {
    fn on_event(&self, event: &ExecEvent<'_>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExecObserver for NoopObserver {
    fn on_event(&self, _event: &ExecEvent<'_>) {}
}

#[derive(Default)]
pub struct Metrics {
    pub operations_total: AtomicU64,
    pub rejected_total: AtomicU64,
    pub matched_total: AtomicU64,
    pub deleted_total: AtomicU64,
    pub updated_total: AtomicU64,
    pub inserted_total: AtomicU64,
    pub returned_total: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub operations_total: u64,
    pub rejected_total: u64,
    pub matched_total: u64,
    pub deleted_total: u64,
    pub updated_total: u64,
    pub inserted_total: u64,
    pub returned_total: u64,
}

impl Metrics {
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            operations_total: get(&self.operations_total),
            rejected_total: get(&self.rejected_total),
            matched_total: get(&self.matched_total),
            deleted_total: get(&self.deleted_total),
            updated_total: get(&self.updated_total),
            inserted_total: get(&self.inserted_total),
            returned_total: get(&self.returned_total),
        }
    }
}

fn bump(c: &AtomicU64, by: u64) {
    c.fetch_add(by, Ordering::Relaxed);
}

/// Default observer: narration via `devlog!`, mutations on the audit target, counters.
#[derive(Default)]
pub struct Telemetry {
    metrics: Metrics,
}

impl Telemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl ExecObserver for Telemetry {
    fn on_event(&self, event: &ExecEvent<'_>) {
        let m = &self.metrics;
        match *event {
            ExecEvent::Started { op, ns, pattern_len } => {
                bump(&m.operations_total, 1);
                crate::devlog!("{} ns:{ns} patternsize:{pattern_len}", op.as_str());
            }
            ExecEvent::GuardRejected { op, ns } => {
                bump(&m.rejected_total, 1);
                log::warn!("{} rejected in reserved namespace {ns}", op.as_str());
                crate::devlog!("{} rejected ns:{ns}", op.as_str());
            }
            ExecEvent::Matched { op, ns, handle } => {
                bump(&m.matched_total, 1);
                crate::devlog!("{} matched {handle} in {ns}", op.as_str());
            }
            ExecEvent::Deleted { ns, handle } => {
                bump(&m.deleted_total, 1);
                log::info!(target: AUDIT_TARGET, "delete ns={ns} record={handle}");
                crate::devlog!("deleted {handle} from {ns}");
            }
            ExecEvent::Updated { ns, handle } => {
                bump(&m.updated_total, 1);
                log::info!(target: AUDIT_TARGET, "update ns={ns} record={handle}");
                crate::devlog!("updated {handle} in {ns}");
            }
            ExecEvent::Inserted { ns, handle } => {
                bump(&m.inserted_total, 1);
                log::info!(target: AUDIT_TARGET, "upsert ns={ns} record={handle}");
                crate::devlog!("upserted {handle} into {ns}");
            }
            ExecEvent::Completed { op, ns, affected, end } => {
                if op == OpKind::Query {
                    bump(&m.returned_total, crate::utils::num::usize_to_u64(affected));
                }
                crate::devlog!("{} done ns:{ns} affected:{affected} end:{end:?}", op.as_str());
            }
        }
    }
}
