use crate::document::Document;
use crate::errors::DbError;
use crate::types::RecordHandle;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{RecordCursor, StorageManager};

type Records = BTreeMap<RecordHandle, Arc<[u8]>>;

/// In-process Storage Manager.
///
/// Handles come from one counter shared by all namespaces, so ascending-handle order within a
/// collection is insertion order. That is the scan order.
#[derive(Default)]
pub struct MemoryStorage {
    collections: RwLock<HashMap<String, Records>>,
    next_handle: AtomicU64,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_handle(&self) -> RecordHandle {
        RecordHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Keeps future allocations above a handle seen during log replay.
    pub(crate) fn reserve_through(&self, handle: RecordHandle) {
        self.next_handle.fetch_max(handle.0.saturating_add(1), Ordering::Relaxed);
    }

    pub(crate) fn contains(&self, ns: &str, handle: RecordHandle) -> bool {
        self.collections.read().get(ns).is_some_and(|c| c.contains_key(&handle))
    }

    /// Writes `bytes` at `handle`, creating the namespace if needed.
    pub(crate) fn put(&self, ns: &str, handle: RecordHandle, bytes: &[u8]) {
        self.collections.write().entry(ns.to_string()).or_default().insert(handle, Arc::from(bytes));
    }

    pub(crate) fn remove(&self, ns: &str, handle: RecordHandle) -> bool {
        self.collections.write().get_mut(ns).is_some_and(|c| c.remove(&handle).is_some())
    }

    fn fetch(&self, ns: &str, handle: RecordHandle) -> Option<Arc<[u8]>> {
        self.collections.read().get(ns)?.get(&handle).cloned()
    }

    fn missing(ns: &str, handle: RecordHandle) -> DbError {
        DbError::StorageFailure(format!("{ns}: no record {handle}"))
    }
}

impl StorageManager for MemoryStorage {
    fn scan(&self, ns: &str) -> Result<Box<dyn RecordCursor + '_>, DbError> {
        let handles: Vec<RecordHandle> =
            self.collections.read().get(ns).map(|c| c.keys().copied().collect()).unwrap_or_default();
        Ok(Box::new(MemoryCursor::new(self, ns, handles)))
    }

    fn insert(&self, ns: &str, doc: &Document<'_>) -> Result<RecordHandle, DbError> {
        let handle = self.allocate_handle();
        self.put(ns, handle, doc.as_bytes());
        Ok(handle)
    }

    fn update(&self, ns: &str, handle: RecordHandle, doc: &Document<'_>) -> Result<(), DbError> {
        let mut guard = self.collections.write();
        let slot = guard.get_mut(ns).and_then(|c| c.get_mut(&handle)).ok_or_else(|| Self::missing(ns, handle))?;
        *slot = Arc::from(doc.as_bytes());
        Ok(())
    }

    fn delete(&self, ns: &str, handle: RecordHandle) -> Result<(), DbError> {
        if self.remove(ns, handle) { Ok(()) } else { Err(Self::missing(ns, handle)) }
    }

    fn count(&self, ns: &str) -> Result<usize, DbError> {
        Ok(self.collections.read().get(ns).map_or(0, BTreeMap::len))
    }

    fn namespaces(&self) -> Result<Vec<String>, DbError> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Cursor over a handle list captured when the scan started.
///
/// Records inserted afterwards are not visited; records removed before the cursor reaches them
/// are skipped. The current record's bytes are pinned by an `Arc`, so the borrowed
/// [`Document`] stays readable even if the record is replaced or removed underneath it.
pub struct MemoryCursor<'a> {
    storage: &'a MemoryStorage,
    ns: String,
    pending: std::vec::IntoIter<RecordHandle>,
    current: Option<(RecordHandle, Arc<[u8]>)>,
}

impl<'a> MemoryCursor<'a> {
    fn new(storage: &'a MemoryStorage, ns: &str, handles: Vec<RecordHandle>) -> Self {
        let mut cursor = Self { storage, ns: ns.to_string(), pending: handles.into_iter(), current: None };
        cursor.advance();
        cursor
    }
}

impl RecordCursor for MemoryCursor<'_> {
    fn has_current(&self) -> bool {
        self.current.is_some()
    }

    fn current(&self) -> Option<Document<'_>> {
        self.current.as_ref().and_then(|(_, bytes)| Document::borrowed(bytes).ok())
    }

    fn current_handle(&self) -> Option<RecordHandle> {
        self.current.as_ref().map(|(h, _)| *h)
    }

    fn advance(&mut self) {
        self.current = None;
        for handle in self.pending.by_ref() {
            if let Some(bytes) = self.storage.fetch(&self.ns, handle) {
                self.current = Some((handle, bytes));
                break;
            }
        }
    }
}
