// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The operation log: one JSON-encoded [`Operation`] per line.

use crate::error::{Result, TLogTreeError};
use diagnostics::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tinytree::Operation;

const RECORD_DELIMITER: u8 = b'\n';

/// Append-only writer over the log file. Writes always land at `offset`,
/// which starts at the end of the existing file.
#[derive(Debug)]
pub struct OpLog {
    path: PathBuf,
    file: File,
    offset: u64,
    sync: bool,
    /// A failed write may have left bytes past `offset` that could not be
    /// cut off yet.
    stale_tail: bool,
}

/// A raw record and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

impl LogRecord {
    pub fn decode(&self) -> Result<Operation> {
        serde_json::from_slice(&self.bytes).map_err(|source| TLogTreeError::Encoding {
            offset: self.offset,
            record: String::from_utf8_lossy(&self.bytes).into_owned(),
            source,
        })
    }
}

/// Encode `op` as a single delimited record.
pub fn encode(op: &Operation) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(op).map_err(TLogTreeError::Serialize)?;
    bytes.push(RECORD_DELIMITER);
    Ok(bytes)
}

impl OpLog {
    /// Open or create the log at `path`.
    pub fn open<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(TLogTreeError::io(format!("opening log {}", path.display())))?;

        let offset = file
            .metadata()
            .map_err(TLogTreeError::io(format!("getting stats for log {}", path.display())))?
            .len();

        debug!("opened log {path} at offset {offset}", path: path.display().to_string(), offset);

        Ok(Self {
            path,
            file,
            offset,
            sync,
            stale_tail: false,
        })
    }

    /// Where the next record will be written.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, op: &Operation) -> Result<u64> {
        let bytes = encode(op)?;
        self.append_encoded(&bytes)
    }

    /// Write an already encoded record at the current offset and advance
    /// past it. Returns the number of bytes written.
    ///
    /// On failure the offset stays put and the file is cut back to it, so a
    /// record reported as failed is never replayed.
    pub fn append_encoded(&mut self, bytes: &[u8]) -> Result<u64> {
        let at = self.offset;
        if self.stale_tail {
            self.cut_tail()?;
        }
        if let Err(err) = self.write_at(at, bytes) {
            self.stale_tail = true;
            if let Err(cut) = self.cut_tail() {
                warn!("could not discard failed write at {at}: {cut}", at, cut: cut.to_string());
            }
            return Err(err);
        }

        let written = bytes.len() as u64;
        self.offset += written;
        debug!("appended {written} bytes at offset {at}", written, at);
        Ok(written)
    }

    fn write_at(&mut self, at: u64, bytes: &[u8]) -> Result<()> {
        _ = self
            .file
            .seek(SeekFrom::Start(at))
            .map_err(TLogTreeError::io("seeking log"))?;
        self.file
            .write_all(bytes)
            .map_err(TLogTreeError::io(format!("writing to log at offset {at}")))?;
        if self.sync {
            self.file
                .sync_data()
                .map_err(TLogTreeError::io("syncing log"))?;
        }
        Ok(())
    }

    /// Drop anything past `offset`.
    fn cut_tail(&mut self) -> Result<()> {
        self.file
            .set_len(self.offset)
            .map_err(TLogTreeError::io(format!("discarding log past offset {}", self.offset)))?;
        self.stale_tail = false;
        Ok(())
    }

    /// Iterate over every record from the start of the file.
    pub fn records(&mut self) -> Result<LogReader<BufReader<&File>>> {
        let mut file = &self.file;
        _ = file
            .seek(SeekFrom::Start(0))
            .map_err(TLogTreeError::io("rewinding log"))?;
        Ok(LogReader::new(BufReader::new(file)))
    }

    /// Move the append offset, used after a replay has found the true end.
    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Discard every record. Only safe once they are all in a snapshot.
    pub fn truncate(&mut self) -> Result<()> {
        self.file
            .set_len(0)
            .map_err(TLogTreeError::io("truncating log"))?;
        if self.sync {
            self.file
                .sync_all()
                .map_err(TLogTreeError::io("syncing truncated log"))?;
        }
        self.offset = 0;
        self.stale_tail = false;
        Ok(())
    }

    pub fn sync_all(&self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(TLogTreeError::io(format!("syncing log {}", self.path.display())))
    }
}

/// Splits a log stream into records. Empty lines are skipped, anything else
/// is handed out as-is for the caller to decode.
#[derive(Debug)]
pub struct LogReader<R> {
    reader: R,
    position: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> LogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
            buf: Vec::new(),
        }
    }

    /// Bytes consumed so far. After the last record this is the log's end.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            let start = self.position;
            match self.reader.read_until(RECORD_DELIMITER, &mut self.buf) {
                Ok(0) => return None,
                Ok(n) => {
                    self.position += n as u64;
                    let record = self.buf.strip_suffix(&[RECORD_DELIMITER]).unwrap_or(&self.buf);
                    if record.is_empty() {
                        continue;
                    }
                    return Some(Ok(LogRecord {
                        offset: start,
                        bytes: record.to_vec(),
                    }));
                }
                Err(e) => {
                    return Some(Err(TLogTreeError::Io {
                        context: format!("reading log at offset {start}"),
                        source: e,
                    }));
                }
            }
        }
    }
}
