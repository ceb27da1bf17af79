//! Storage Manager boundary.
//!
//! The executor never touches record layout; it sees a full-collection scan, insert, in-place
//! update and delete-by-handle. All methods take `&self` so a live cursor (which borrows the
//! storage) can coexist with the mutations an operation issues; implementations serialize
//! internally.
//!
//! ```text
//! StorageManager
//!   ├── MemoryStorage (in-process, reference semantics)
//!   └── WalStorage    (MemoryStorage + append-only log, replayed on open)
//! ```

mod memory;
mod wal;

pub use memory::{MemoryCursor, MemoryStorage};
pub use wal::{WalRecord, WalStorage, read_record, write_record};

use crate::document::Document;
use crate::errors::DbError;
use crate::types::RecordHandle;

/// Forward-only scan position over one collection.
///
/// Order comes from the Storage Manager and never from document content. A document returned
/// by [`RecordCursor::current`] borrows the cursor, so it cannot be held across `advance`.
pub trait RecordCursor {
    fn has_current(&self) -> bool;
    fn current(&self) -> Option<Document<'_>>;
    fn current_handle(&self) -> Option<RecordHandle>;
    /// Moves to the next record; the previous position is no longer reachable.
    fn advance(&mut self);
}

pub trait StorageManager: Send + Sync {
    /// Full scan of `ns` in a stable order. Unknown namespaces scan as empty.
    fn scan(&self, ns: &str) -> Result<Box<dyn RecordCursor + '_>, DbError>;
    fn insert(&self, ns: &str, doc: &Document<'_>) -> Result<RecordHandle, DbError>;
    /// Replaces the record's bytes in place; its scan position does not change.
    fn update(&self, ns: &str, handle: RecordHandle, doc: &Document<'_>) -> Result<(), DbError>;
    fn delete(&self, ns: &str, handle: RecordHandle) -> Result<(), DbError>;
    fn count(&self, ns: &str) -> Result<usize, DbError>;
    fn namespaces(&self) -> Result<Vec<String>, DbError>;
}

/// One scan step: inspect the current document, capture its handle, then advance.
///
/// The handle is handed back only after the cursor has moved past the record, so whatever the
/// caller does with it (delete, update) cannot disturb the cursor's notion of "next".
/// Returns `None` once the cursor is exhausted.
pub fn visit_and_advance<T>(
    cursor: &mut (dyn RecordCursor + '_),
    inspect: impl FnOnce(&Document<'_>) -> T,
) -> Option<(RecordHandle, T)> {
    loop {
        if !cursor.has_current() {
            return None;
        }
        if cursor.current_handle().is_some() && cursor.current().is_some() {
            break;
        }
        log::debug!("cursor position without a readable record; skipped");
        cursor.advance();
    }
    let handle = cursor.current_handle()?;
    let seen = {
        let doc = cursor.current()?;
        inspect(&doc)
    };
    cursor.advance();
    Some((handle, seen))
}
