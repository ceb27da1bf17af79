//! Wire-format reply for read queries.
//!
//! ```text
//! offset  field         type
//!  0      length        i32   total bytes, header included
//!  4      reserved      i32   0
//!  8      operation     i32   OP_REPLY
//! 12      cursorId      i64   0, no live cursor is kept
//! 20      startingFrom  i32   0
//! 24      nReturned     i32   documents in the payload
//! 28      payload             documents back to back, each self-length-prefixed
//! ```
//!
//! All fields are little-endian. [`ReplyBuilder`] reserves the header, collects documents, and
//! writes the header only in [`ReplyBuilder::finish`], which consumes the builder and moves the
//! buffer into the returned [`Reply`].

use crate::document::{Document, declared_len};
use crate::errors::DbError;
use crate::utils::num::{i32_to_usize, usize_to_i32};

pub const OP_REPLY: i32 = 1;
pub const REPLY_HEADER_LEN: usize = 28;

const LENGTH_AT: usize = 0;
const RESERVED_AT: usize = 4;
const OPERATION_AT: usize = 8;
const CURSOR_ID_AT: usize = 12;
const STARTING_FROM_AT: usize = 20;
const N_RETURNED_AT: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyHeader {
    pub length: i32,
    pub reserved: i32,
    pub operation: i32,
    pub cursor_id: i64,
    pub starting_from: i32,
    pub n_returned: i32,
}

impl ReplyHeader {
    fn write_into(&self, buf: &mut [u8]) {
        buf[LENGTH_AT..LENGTH_AT + 4].copy_from_slice(&self.length.to_le_bytes());
        buf[RESERVED_AT..RESERVED_AT + 4].copy_from_slice(&self.reserved.to_le_bytes());
        buf[OPERATION_AT..OPERATION_AT + 4].copy_from_slice(&self.operation.to_le_bytes());
        buf[CURSOR_ID_AT..CURSOR_ID_AT + 8].copy_from_slice(&self.cursor_id.to_le_bytes());
        buf[STARTING_FROM_AT..STARTING_FROM_AT + 4].copy_from_slice(&self.starting_from.to_le_bytes());
        buf[N_RETURNED_AT..N_RETURNED_AT + 4].copy_from_slice(&self.n_returned.to_le_bytes());
    }

    fn read_from(buf: &[u8]) -> Option<Self> {
        let head = buf.get(..REPLY_HEADER_LEN)?;
        let i32_at = |at: usize| -> Option<i32> { Some(i32::from_le_bytes(head.get(at..at + 4)?.try_into().ok()?)) };
        let cursor_id = i64::from_le_bytes(head.get(CURSOR_ID_AT..CURSOR_ID_AT + 8)?.try_into().ok()?);
        Some(Self {
            length: i32_at(LENGTH_AT)?,
            reserved: i32_at(RESERVED_AT)?,
            operation: i32_at(OPERATION_AT)?,
            cursor_id,
            starting_from: i32_at(STARTING_FROM_AT)?,
            n_returned: i32_at(N_RETURNED_AT)?,
        })
    }
}

/// Reserve / append / finalize builder for a [`Reply`].
#[derive(Debug)]
pub struct ReplyBuilder {
    buf: Vec<u8>,
    n_returned: usize,
}

impl Default for ReplyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::len_without_is_empty)]
impl ReplyBuilder {
    /// Starts a buffer with the header region zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self { buf: vec![0u8; REPLY_HEADER_LEN], n_returned: 0 }
    }

    /// # Errors
    /// `ReplyTooLarge` if the document would push the reply past what the `i32` length field
    /// can describe. The builder is left unchanged in that case.
    pub fn append(&mut self, doc: &Document<'_>) -> Result<(), DbError> {
        let new_len = self.buf.len().checked_add(doc.len()).ok_or(DbError::ReplyTooLarge(usize::MAX))?;
        if usize_to_i32(new_len).is_none() {
            return Err(DbError::ReplyTooLarge(new_len));
        }
        self.buf.extend_from_slice(doc.as_bytes());
        self.n_returned += 1;
        Ok(())
    }

    #[must_use]
    pub fn n_returned(&self) -> usize {
        self.n_returned
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn has_documents(&self) -> bool {
        self.n_returned > 0
    }

    /// Writes the header into the reserved region and hands the buffer over.
    pub fn finish(self) -> Result<Reply, DbError> {
        let Self { mut buf, n_returned } = self;
        let length = usize_to_i32(buf.len()).ok_or(DbError::ReplyTooLarge(buf.len()))?;
        let n_returned = usize_to_i32(n_returned).ok_or(DbError::ReplyTooLarge(buf.len()))?;
        let header = ReplyHeader {
            length,
            reserved: 0,
            operation: OP_REPLY,
            cursor_id: 0,
            starting_from: 0,
            n_returned,
        };
        header.write_into(&mut buf[..REPLY_HEADER_LEN]);
        Ok(Reply { buf, header })
    }
}

/// A finished reply. Owns its buffer outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    buf: Vec<u8>,
    header: ReplyHeader,
}

#[allow(clippy::len_without_is_empty)]
impl Reply {
    /// Validates a reply received as raw bytes.
    ///
    /// # Errors
    /// `InvalidReply` when the header is short, its length disagrees with the buffer, the payload
    /// does not split into whole documents, or the document count differs from `nReturned`.
    pub fn from_bytes(buf: Vec<u8>) -> Result<Self, DbError> {
        let header = ReplyHeader::read_from(&buf)
            .ok_or_else(|| DbError::InvalidReply(format!("{} bytes is shorter than the header", buf.len())))?;
        if i32_to_usize(header.length) != Some(buf.len()) {
            return Err(DbError::InvalidReply(format!(
                "header length {} but {} bytes received",
                header.length,
                buf.len()
            )));
        }
        if header.operation != OP_REPLY {
            return Err(DbError::InvalidReply(format!("operation {} is not a reply", header.operation)));
        }
        let reply = Self { buf, header };
        let mut seen = 0usize;
        for doc in reply.documents() {
            doc?;
            seen += 1;
        }
        if i32_to_usize(header.n_returned) != Some(seen) {
            return Err(DbError::InvalidReply(format!("nReturned {} but {seen} documents", header.n_returned)));
        }
        Ok(reply)
    }

    #[must_use]
    pub fn header(&self) -> ReplyHeader {
        self.header
    }

    #[must_use]
    pub fn n_returned(&self) -> usize {
        i32_to_usize(self.header.n_returned).unwrap_or(0)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `len()` counts the header too, so a reply with nothing in it is still 28 bytes long.
    #[must_use]
    pub fn has_documents(&self) -> bool {
        self.header.n_returned > 0
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.buf[REPLY_HEADER_LEN..]
    }

    /// Borrowed views of the payload documents, in reply order.
    pub fn documents(&self) -> Documents<'_> {
        Documents { rest: self.payload() }
    }
}

/// Iterator over the documents of a [`Reply`]. Stops after the first framing error.
pub struct Documents<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Documents<'a> {
    type Item = Result<Document<'a>, DbError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let framed = declared_len(self.rest).filter(|n| *n <= self.rest.len());
        let Some(n) = framed else {
            let left = self.rest.len();
            self.rest = &[];
            return Some(Err(DbError::InvalidReply(format!("truncated document in last {left} bytes"))));
        };
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        match Document::borrowed(head) {
            Ok(doc) => Some(Ok(doc)),
            Err(e) => {
                self.rest = &[];
                Some(Err(DbError::InvalidReply(e.to_string())))
            }
        }
    }
}
