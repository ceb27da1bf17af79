use crate::document::Document;
use crate::errors::DbError;
use crate::query::Matcher;
use crate::reply::{Reply, ReplyBuilder};
use crate::storage::visit_and_advance;
use crate::telemetry::ExecEvent;
use crate::types::{OpKind, ScanEnd};
use crate::utils::num::i32_to_usize;

use super::Executor;

impl Executor {
    /// Collects records of `ns` matching `pattern` into a wire reply, stopping after
    /// `max_results` matches. `0` means no cap; a negative cap returns at most one document.
    /// Reserved namespaces are readable.
    ///
    /// # Errors
    /// `MalformedPattern`, a storage failure, or `ReplyTooLarge` when the matches would not fit
    /// the reply's `i32` length field.
    pub fn run_query(&self, ns: &str, max_results: i32, pattern: &Document<'_>) -> Result<Reply, DbError> {
        let op = OpKind::Query;
        self.emit(ExecEvent::Started { op, ns, pattern_len: pattern.len() });
        let matcher = Matcher::compile(pattern)?;
        let cap = match max_results {
            0 => None,
            n => Some(i32_to_usize(n).unwrap_or(1)),
        };

        let mut cursor = self.storage.scan(ns)?;
        let mut reply = ReplyBuilder::new();
        let mut end = ScanEnd::Exhausted;
        while let Some((handle, appended)) = visit_and_advance(&mut *cursor, |doc| {
            if matcher.matches(doc) { reply.append(doc).map(|()| true) } else { Ok(false) }
        }) {
            if !appended? {
                continue;
            }
            self.emit(ExecEvent::Matched { op, ns, handle });
            if cap.is_some_and(|cap| reply.n_returned() >= cap) {
                end = ScanEnd::TerminatedEarly;
                break;
            }
        }
        drop(cursor);

        let n = reply.n_returned();
        let reply = reply.finish()?;
        self.emit(ExecEvent::Completed { op, ns, affected: n, end });
        Ok(reply)
    }
}
