use crate::document::Document;
use crate::errors::DbError;

use super::eval::eval_filter;
use super::parse::compile_pattern;
use super::types::Filter;

/// A filter pattern compiled once and evaluated against many candidates.
///
/// Evaluation never mutates the matcher, so one instance may be shared across threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    filter: Filter,
}

impl Matcher {
    /// # Errors
    /// `MalformedPattern` if the bytes do not decode as a document or use an unsupported shape.
    pub fn compile(pattern: &Document<'_>) -> Result<Self, DbError> {
        let decoded = pattern
            .to_bson()
            .map_err(|e| DbError::MalformedPattern(format!("pattern does not decode: {e}")))?;
        Ok(Self { filter: compile_pattern(&decoded)? })
    }

    /// Candidates whose bytes fail to decode never match.
    #[must_use]
    pub fn matches(&self, candidate: &Document<'_>) -> bool {
        match candidate.to_bson() {
            Ok(doc) => eval_filter(&doc, &self.filter),
            Err(e) => {
                log::debug!("unreadable candidate ({} bytes): {e}", candidate.len());
                false
            }
        }
    }
}
