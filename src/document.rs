//! Length-framed record bytes.
//!
//! A [`Document`] is the unit the executor moves around: one stored record or one caller-built
//! payload. The bytes are a BSON document, but outside of the matcher nothing looks past the
//! frame: a little-endian `i32` total length up front and a trailing NUL.

use crate::errors::{DbError, Result};
use bson::Document as BsonDocument;
use std::borrow::Cow;

/// Smallest legal frame: the length prefix plus the terminator.
pub const MIN_DOCUMENT_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    bytes: Cow<'a, [u8]>,
}

impl<'a> Document<'a> {
    /// Zero-copy view over storage-owned bytes.
    pub fn borrowed(bytes: &'a [u8]) -> Result<Self> {
        check_frame(bytes)?;
        Ok(Self { bytes: Cow::Borrowed(bytes) })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a framed document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.bytes, Cow::Borrowed(_))
    }

    /// Decodes the fields. Only the matcher and presentation layers need this.
    pub fn to_bson(&self) -> Result<BsonDocument> {
        Ok(BsonDocument::from_reader(&mut &self.bytes[..])?)
    }

    #[must_use]
    pub fn into_owned(self) -> Document<'static> {
        Document { bytes: Cow::Owned(self.bytes.into_owned()) }
    }
}

impl Document<'static> {
    /// Takes ownership of a caller-built buffer.
    pub fn owned(bytes: Vec<u8>) -> Result<Self> {
        check_frame(&bytes)?;
        Ok(Self { bytes: Cow::Owned(bytes) })
    }

    pub fn from_bson(doc: &BsonDocument) -> Result<Self> {
        let mut buf = Vec::new();
        doc.to_writer(&mut buf)?;
        Self::owned(buf)
    }
}

impl TryFrom<&BsonDocument> for Document<'static> {
    type Error = DbError;
    fn try_from(doc: &BsonDocument) -> Result<Self> {
        Self::from_bson(doc)
    }
}

impl AsRef<[u8]> for Document<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Reads the declared length of the frame starting at `bytes[0]`, if four bytes are available.
#[must_use]
pub fn declared_len(bytes: &[u8]) -> Option<usize> {
    let head: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    crate::utils::num::i32_to_usize(i32::from_le_bytes(head))
}

fn check_frame(bytes: &[u8]) -> Result<()> {
    if bytes.len() < MIN_DOCUMENT_LEN {
        return Err(DbError::InvalidDocument(format!("{} bytes is below the minimum frame", bytes.len())));
    }
    match declared_len(bytes) {
        Some(n) if n == bytes.len() => {}
        Some(n) => {
            return Err(DbError::InvalidDocument(format!(
                "declared length {n} does not match {} bytes",
                bytes.len()
            )));
        }
        None => return Err(DbError::InvalidDocument("negative length prefix".into())),
    }
    if bytes[bytes.len() - 1] != 0 {
        return Err(DbError::InvalidDocument("missing terminator".into()));
    }
    Ok(())
}
