#![cfg(test)]

// Test-only helpers: document builders, seeded storage, and storage wrappers that trace the
// order of cursor moves and mutations or fail on demand.
use crate::document::Document;
use crate::errors::DbError;
use crate::storage::{MemoryStorage, RecordCursor, StorageManager};
use crate::telemetry::{ExecEvent, ExecObserver};
use crate::types::RecordHandle;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn doc_of(b: bson::Document) -> Document<'static> {
    Document::from_bson(&b).expect("bson encodes")
}

pub fn seeded(ns: &str, docs: Vec<bson::Document>) -> Arc<MemoryStorage> {
    let st = Arc::new(MemoryStorage::new());
    for d in docs {
        st.insert(ns, &doc_of(d)).expect("insert");
    }
    st
}

/// Every record of `ns` in scan order, decoded.
pub fn scan_all(st: &dyn StorageManager, ns: &str) -> Vec<bson::Document> {
    let mut cur = st.scan(ns).expect("scan");
    let mut out = Vec::new();
    while let Some(doc) = cur.current() {
        out.push(doc.to_bson().expect("decode"));
        cur.advance();
    }
    out
}

/// Observer that keeps every event as a short string.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl ExecObserver for RecordingObserver {
    fn on_event(&self, event: &ExecEvent<'_>) {
        let line = match *event {
            ExecEvent::Started { op, .. } => format!("start {}", op.as_str()),
            ExecEvent::GuardRejected { op, .. } => format!("rejected {}", op.as_str()),
            ExecEvent::Matched { handle, .. } => format!("match {handle}"),
            ExecEvent::Deleted { handle, .. } => format!("deleted {handle}"),
            ExecEvent::Updated { handle, .. } => format!("updated {handle}"),
            ExecEvent::Inserted { handle, .. } => format!("inserted {handle}"),
            ExecEvent::Completed { affected, end, .. } => format!("done {affected} {end:?}"),
        };
        self.events.lock().push(line);
    }
}

/// Wraps `MemoryStorage` and logs `scan`, `advance from #h`, `delete #h`, `update #h`,
/// `insert #h`. A cursor that advances off a record which no longer exists logs `stale #h`.
pub struct TracingStorage {
    pub inner: MemoryStorage,
    pub trace: Mutex<Vec<String>>,
}

impl TracingStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self { inner, trace: Mutex::new(Vec::new()) }
    }

    pub fn log(&self) -> Vec<String> {
        self.trace.lock().clone()
    }

    fn push(&self, s: String) {
        self.trace.lock().push(s);
    }
}

struct TracingCursor<'a> {
    owner: &'a TracingStorage,
    ns: String,
    inner: Box<dyn RecordCursor + 'a>,
}

impl RecordCursor for TracingCursor<'_> {
    fn has_current(&self) -> bool {
        self.inner.has_current()
    }

    fn current(&self) -> Option<Document<'_>> {
        self.inner.current()
    }

    fn current_handle(&self) -> Option<RecordHandle> {
        self.inner.current_handle()
    }

    fn advance(&mut self) {
        if let Some(h) = self.inner.current_handle() {
            if !self.owner.inner.contains(&self.ns, h) {
                self.owner.push(format!("stale {h}"));
            }
            self.owner.push(format!("advance from {h}"));
        }
        self.inner.advance();
    }
}

impl StorageManager for TracingStorage {
    fn scan(&self, ns: &str) -> Result<Box<dyn RecordCursor + '_>, DbError> {
        self.push("scan".into());
        Ok(Box::new(TracingCursor { owner: self, ns: ns.to_string(), inner: self.inner.scan(ns)? }))
    }

    fn insert(&self, ns: &str, doc: &Document<'_>) -> Result<RecordHandle, DbError> {
        let h = self.inner.insert(ns, doc)?;
        self.push(format!("insert {h}"));
        Ok(h)
    }

    fn update(&self, ns: &str, handle: RecordHandle, doc: &Document<'_>) -> Result<(), DbError> {
        self.push(format!("update {handle}"));
        self.inner.update(ns, handle, doc)
    }

    fn delete(&self, ns: &str, handle: RecordHandle) -> Result<(), DbError> {
        self.push(format!("delete {handle}"));
        self.inner.delete(ns, handle)
    }

    fn count(&self, ns: &str) -> Result<usize, DbError> {
        self.inner.count(ns)
    }

    fn namespaces(&self) -> Result<Vec<String>, DbError> {
        self.inner.namespaces()
    }
}

/// Storage whose mutations succeed `allowed` times, then fail; scans delegate to the wrapped
/// memory store.
pub struct FailingStorage {
    pub inner: MemoryStorage,
    allowed: usize,
    used: AtomicUsize,
}

impl FailingStorage {
    pub fn always(inner: MemoryStorage) -> Self {
        Self::after(inner, 0)
    }

    pub fn after(inner: MemoryStorage, allowed: usize) -> Self {
        Self { inner, allowed, used: AtomicUsize::new(0) }
    }

    fn permit(&self, what: String) -> Result<(), DbError> {
        if self.used.fetch_add(1, Ordering::SeqCst) < self.allowed {
            Ok(())
        } else {
            Err(DbError::StorageFailure(format!("{what} refused")))
        }
    }
}

impl StorageManager for FailingStorage {
    fn scan(&self, ns: &str) -> Result<Box<dyn RecordCursor + '_>, DbError> {
        self.inner.scan(ns)
    }

    fn insert(&self, ns: &str, doc: &Document<'_>) -> Result<RecordHandle, DbError> {
        self.permit(format!("{ns}: insert"))?;
        self.inner.insert(ns, doc)
    }

    fn update(&self, ns: &str, handle: RecordHandle, doc: &Document<'_>) -> Result<(), DbError> {
        self.permit(format!("{ns}: update {handle}"))?;
        self.inner.update(ns, handle, doc)
    }

    fn delete(&self, ns: &str, handle: RecordHandle) -> Result<(), DbError> {
        self.permit(format!("{ns}: delete {handle}"))?;
        self.inner.delete(ns, handle)
    }

    fn count(&self, ns: &str) -> Result<usize, DbError> {
        self.inner.count(ns)
    }

    fn namespaces(&self) -> Result<Vec<String>, DbError> {
        self.inner.namespaces()
    }
}
