use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable locator for one stored record.
///
/// Survives cursor advancement; dies with the record it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordHandle(pub u64);

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of `update_objects`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOutcome {
    Updated,
    Inserted,
    NoOp,
}

impl UpdateOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Inserted => "inserted",
            Self::NoOp => "noop",
        }
    }
}

/// How a scan loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// The cursor ran out of records.
    Exhausted,
    /// A delete-one hit, an update hit, or the result cap was reached.
    TerminatedEarly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Delete,
    Update,
    Query,
}

impl OpKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Query => "query",
        }
    }
}

/// Literal prefix test used by the namespace guard.
#[must_use]
pub fn is_reserved(ns: &str, reserved_prefix: &str) -> bool {
    !reserved_prefix.is_empty() && ns.starts_with(reserved_prefix)
}
