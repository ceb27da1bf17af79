use crate::document::Document;
use crate::errors::DbError;
use crate::query::Matcher;
use crate::storage::visit_and_advance;
use crate::telemetry::ExecEvent;
use crate::types::{OpKind, ScanEnd, UpdateOutcome};

use super::Executor;

impl Executor {
    /// Deletes records of `ns` matching `pattern`; only the first in scan order when
    /// `only_first` is set. Returns the number deleted.
    ///
    /// # Errors
    /// `PermissionDenied` for reserved namespaces, `MalformedPattern`, or a storage failure.
    /// Deletions issued before a storage failure stay committed.
    pub fn delete_objects(&self, ns: &str, pattern: &Document<'_>, only_first: bool) -> Result<u64, DbError> {
        let op = OpKind::Delete;
        self.emit(ExecEvent::Started { op, ns, pattern_len: pattern.len() });
        self.guard(op, ns)?;
        let matcher = Matcher::compile(pattern)?;

        let mut cursor = self.storage.scan(ns)?;
        let mut deleted = 0usize;
        let mut end = ScanEnd::Exhausted;
        while let Some((handle, hit)) = visit_and_advance(&mut *cursor, |doc| matcher.matches(doc)) {
            if !hit {
                continue;
            }
            self.emit(ExecEvent::Matched { op, ns, handle });
            // The cursor is already past `handle`.
            self.storage.delete(ns, handle)?;
            deleted += 1;
            self.emit(ExecEvent::Deleted { ns, handle });
            if only_first {
                end = ScanEnd::TerminatedEarly;
                break;
            }
        }
        self.emit(ExecEvent::Completed { op, ns, affected: deleted, end });
        Ok(crate::utils::num::usize_to_u64(deleted))
    }

    /// Replaces the first record of `ns` matching `pattern` with `new_doc`. With `upsert`,
    /// inserts `new_doc` when nothing matches.
    ///
    /// # Errors
    /// `PermissionDenied` for reserved namespaces, `MalformedPattern`, or a storage failure.
    pub fn update_objects(
        &self,
        ns: &str,
        new_doc: &Document<'_>,
        pattern: &Document<'_>,
        upsert: bool,
    ) -> Result<UpdateOutcome, DbError> {
        let op = OpKind::Update;
        self.emit(ExecEvent::Started { op, ns, pattern_len: pattern.len() });
        self.guard(op, ns)?;
        let matcher = Matcher::compile(pattern)?;

        let mut cursor = self.storage.scan(ns)?;
        while let Some((handle, hit)) = visit_and_advance(&mut *cursor, |doc| matcher.matches(doc)) {
            if !hit {
                continue;
            }
            self.emit(ExecEvent::Matched { op, ns, handle });
            self.storage.update(ns, handle, new_doc)?;
            self.emit(ExecEvent::Updated { ns, handle });
            self.emit(ExecEvent::Completed { op, ns, affected: 1, end: ScanEnd::TerminatedEarly });
            return Ok(UpdateOutcome::Updated);
        }
        drop(cursor);

        if !upsert {
            self.emit(ExecEvent::Completed { op, ns, affected: 0, end: ScanEnd::Exhausted });
            return Ok(UpdateOutcome::NoOp);
        }
        let handle = self.storage.insert(ns, new_doc)?;
        self.emit(ExecEvent::Inserted { ns, handle });
        self.emit(ExecEvent::Completed { op, ns, affected: 1, end: ScanEnd::Exhausted });
        Ok(UpdateOutcome::Inserted)
    }
}
