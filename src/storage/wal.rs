use crate::document::Document;
use crate::errors::DbError;
use crate::types::RecordHandle;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::memory::MemoryStorage;
use super::{RecordCursor, StorageManager};

/// Frame header: payload length then CRC32 of the payload, both little-endian.
const FRAME_HEADER_LEN: usize = 8;
const MAX_RECORD_LEN: usize = 64 * 1024 * 1024;

/// One logged mutation, bincode-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalRecord {
    Insert { ns: String, handle: RecordHandle, bytes: Vec<u8> },
    Update { ns: String, handle: RecordHandle, bytes: Vec<u8> },
    Delete { ns: String, handle: RecordHandle },
}

/// Appends one framed record; returns the number of bytes written.
pub fn write_record<W: Write>(writer: &mut W, rec: &WalRecord) -> Result<usize, DbError> {
    let payload = bincode::serde::encode_to_vec(rec, bincode::config::standard())?;
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|_| payload.len() <= MAX_RECORD_LEN)
        .ok_or_else(|| DbError::StorageFailure(format!("wal record of {} bytes", payload.len())))?;
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    writer.write_all(&frame)?;
    Ok(frame.len())
}

/// Reads the next framed record and its on-disk size. `Ok(None)` at a clean end of log.
///
/// # Errors
/// A frame cut short surfaces as `Io(UnexpectedEof)`; a bad checksum or oversized length as
/// `StorageFailure`; an undecodable payload as `Decode`.
pub fn read_record<R: Read>(reader: &mut R) -> Result<Option<(WalRecord, usize)>, DbError> {
    let mut header = [0u8; FRAME_HEADER_LEN];
    let mut filled = 0;
    while filled < FRAME_HEADER_LEN {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(DbError::Io(ErrorKind::UnexpectedEof.into())),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(DbError::Io(e)),
        }
    }
    let len = crate::utils::num::u32_to_usize(u32::from_le_bytes([header[0], header[1], header[2], header[3]]));
    let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if len > MAX_RECORD_LEN {
        return Err(DbError::StorageFailure(format!("wal frame claims {len} bytes")));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    if crc32fast::hash(&payload) != crc {
        return Err(DbError::StorageFailure("wal checksum mismatch".into()));
    }
    let (rec, _) = bincode::serde::decode_from_slice::<WalRecord, _>(&payload, bincode::config::standard())?;
    Ok(Some((rec, FRAME_HEADER_LEN + len)))
}

/// Outcome of decoding the frame at the start of a byte slice.
enum Frame {
    End,
    Valid(WalRecord, usize),
    Corrupt,
}

fn frame_at(buf: &[u8]) -> Frame {
    if buf.is_empty() {
        return Frame::End;
    }
    let Some(header) = buf.get(..FRAME_HEADER_LEN) else { return Frame::Corrupt };
    let len = crate::utils::num::u32_to_usize(u32::from_le_bytes([header[0], header[1], header[2], header[3]]));
    let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if len > MAX_RECORD_LEN {
        return Frame::Corrupt;
    }
    let Some(payload) = buf.get(FRAME_HEADER_LEN..FRAME_HEADER_LEN + len) else { return Frame::Corrupt };
    if crc32fast::hash(payload) != crc {
        return Frame::Corrupt;
    }
    match bincode::serde::decode_from_slice::<WalRecord, _>(payload, bincode::config::standard()) {
        Ok((rec, _)) => Frame::Valid(rec, FRAME_HEADER_LEN + len),
        Err(_) => Frame::Corrupt,
    }
}

/// Offset of the first decodable frame at or after `from`.
fn next_valid_frame(buf: &[u8], from: usize) -> Option<usize> {
    (from..buf.len()).find(|&off| matches!(frame_at(&buf[off..]), Frame::Valid(..)))
}

fn storage_failure(err: DbError) -> DbError {
    match err {
        DbError::StorageFailure(_) => err,
        other => DbError::StorageFailure(other.to_string()),
    }
}

/// Durable Storage Manager: [`MemoryStorage`] state rebuilt from an append-only log.
///
/// Every mutation is framed and written to the log before it is applied in memory. A write that
/// fails is cut back off the log; if that cut fails too, the storage refuses further mutations.
/// On open, the log is replayed. Corrupt frames followed by valid ones are skipped; a corrupt
/// tail is truncated so later appends land on a clean frame boundary.
pub struct WalStorage {
    mem: MemoryStorage,
    log: Mutex<File>,
    path: PathBuf,
    sync_on_write: bool,
    broken: AtomicBool,
}

impl WalStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Self::open_with(path, false)
    }

    pub fn open_with(path: impl AsRef<Path>, sync_on_write: bool) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().create(true).read(true).append(true).open(&path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let mem = MemoryStorage::new();
        let replayed = replay(&bytes, &mem);
        if replayed.skipped > 0 {
            log::warn!("wal {}: skipped {} corrupt bytes between valid records", path.display(), replayed.skipped);
        }
        let on_disk = crate::utils::num::usize_to_u64(bytes.len());
        if replayed.good_len < on_disk {
            log::warn!(
                "wal {}: discarding {} trailing bytes after {} records",
                path.display(),
                on_disk - replayed.good_len,
                replayed.applied
            );
            file.set_len(replayed.good_len)?;
        }
        log::info!("wal {}: replayed {} records", path.display(), replayed.applied);
        Ok(Self { mem, log: Mutex::new(file), path, sync_on_write, broken: AtomicBool::new(false) })
    }

    fn append(&self, log: &mut File, rec: &WalRecord) -> Result<(), DbError> {
        if self.broken.load(Ordering::Acquire) {
            return Err(DbError::StorageFailure(format!(
                "wal {}: refusing writes after an unrecoverable append failure",
                self.path.display()
            )));
        }
        let start = log.metadata().map_err(|e| storage_failure(e.into()))?.len();
        let written = write_record(log, rec).and_then(|_| {
            if self.sync_on_write { log.sync_data().map_err(DbError::from) } else { Ok(()) }
        });
        if let Err(e) = written {
            if let Err(cut) = log.set_len(start) {
                log::error!("wal {}: could not cut failed append back to {start}: {cut}", self.path.display());
                self.broken.store(true, Ordering::Release);
            }
            return Err(storage_failure(e));
        }
        Ok(())
    }
}

struct Replayed {
    applied: usize,
    /// End of the last valid frame.
    good_len: u64,
    skipped: usize,
}

fn replay(bytes: &[u8], mem: &MemoryStorage) -> Replayed {
    let mut out = Replayed { applied: 0, good_len: 0, skipped: 0 };
    let mut pos = 0usize;
    loop {
        let (rec, size) = match frame_at(&bytes[pos..]) {
            Frame::End => break,
            Frame::Valid(rec, size) => (rec, size),
            Frame::Corrupt => match next_valid_frame(bytes, pos + 1) {
                Some(next) => {
                    log::warn!("wal replay: corrupt frame at offset {pos}, resuming at {next}");
                    out.skipped += next - pos;
                    pos = next;
                    continue;
                }
                None => break,
            },
        };
        match rec {
            WalRecord::Insert { ns, handle, bytes } | WalRecord::Update { ns, handle, bytes } => {
                mem.reserve_through(handle);
                mem.put(&ns, handle, &bytes);
            }
            WalRecord::Delete { ns, handle } => {
                if !mem.remove(&ns, handle) {
                    log::debug!("wal replay: delete of unknown record {ns} {handle}");
                }
            }
        }
        out.applied += 1;
        pos += size;
        out.good_len = crate::utils::num::usize_to_u64(pos);
    }
    out
}

impl StorageManager for WalStorage {
    fn scan(&self, ns: &str) -> Result<Box<dyn RecordCursor + '_>, DbError> {
        self.mem.scan(ns)
    }

    fn insert(&self, ns: &str, doc: &Document<'_>) -> Result<RecordHandle, DbError> {
        let mut log = self.log.lock();
        let handle = self.mem.allocate_handle();
        let rec = WalRecord::Insert { ns: ns.to_string(), handle, bytes: doc.as_bytes().to_vec() };
        self.append(&mut log, &rec)?;
        self.mem.put(ns, handle, doc.as_bytes());
        Ok(handle)
    }

    fn update(&self, ns: &str, handle: RecordHandle, doc: &Document<'_>) -> Result<(), DbError> {
        let mut log = self.log.lock();
        if !self.mem.contains(ns, handle) {
            return Err(DbError::StorageFailure(format!("{ns}: no record {handle}")));
        }
        let rec = WalRecord::Update { ns: ns.to_string(), handle, bytes: doc.as_bytes().to_vec() };
        self.append(&mut log, &rec)?;
        self.mem.put(ns, handle, doc.as_bytes());
        Ok(())
    }

    fn delete(&self, ns: &str, handle: RecordHandle) -> Result<(), DbError> {
        let mut log = self.log.lock();
        if !self.mem.contains(ns, handle) {
            return Err(DbError::StorageFailure(format!("{ns}: no record {handle}")));
        }
        self.append(&mut log, &WalRecord::Delete { ns: ns.to_string(), handle })?;
        self.mem.remove(ns, handle);
        Ok(())
    }

    fn count(&self, ns: &str) -> Result<usize, DbError> {
        self.mem.count(ns)
    }

    fn namespaces(&self) -> Result<Vec<String>, DbError> {
        self.mem.namespaces()
    }
}
