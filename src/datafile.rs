//! Append-only fixed-width data file.
//!
//! Records are addressed by their zero-based line number, which is a
//! permanent address: deletion tombstones a slot in place and nothing
//! is ever compacted or renumbered. Every method opens and closes the
//! file within the call; no handles are held across operations.

use crate::error::{Error, Result};
use crate::record::{
    self, decode_record, encode_record, is_tombstone, RECORD_WIDTH,
};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One append-only data file of fixed-width records.
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    /// Create a handle for the data file at `path`.
    ///
    /// The file itself is created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of complete record slots currently in the file.
    ///
    /// A missing file counts as zero slots.
    pub fn line_count(&self) -> Result<u64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() / RECORD_WIDTH as u64),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Append a record, returning its permanent line number.
    ///
    /// The line number is derived from the file's current byte length,
    /// so it continues correctly across process restarts.
    pub fn append(&self, fields: &[String]) -> Result<u64> {
        let line = encode_record(fields)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line_number = file.metadata()?.len() / RECORD_WIDTH as u64;
        file.write_all(line.as_bytes())?;

        Ok(line_number)
    }

    /// Read the record at `line_number`.
    ///
    /// Returns `None` if the file does not exist or the slot lies at or
    /// past end-of-file. A partially filled slot (short read) also
    /// counts as "no such line".
    pub fn read_line(&self, line_number: u64) -> Result<Option<Vec<String>>> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        file.seek(SeekFrom::Start(line_number * RECORD_WIDTH as u64))?;

        let mut buf = vec![0u8; RECORD_WIDTH];
        let n = read_full(&mut file, &mut buf)?;
        if n < RECORD_WIDTH {
            return Ok(None);
        }

        let line = std::str::from_utf8(&buf)
            .map_err(|e| Error::corruption(format!("non-UTF-8 record at line {}: {}", line_number, e)))?;
        Ok(Some(decode_record(line)))
    }

    /// Replace exactly one field of the record at `line_number` in
    /// place, preserving the slot width, and return the updated record.
    ///
    /// Used for car status transitions and VIN renames; the record's
    /// line number never changes.
    pub fn overwrite_field(
        &self,
        line_number: u64,
        field_index: usize,
        new_value: &str,
    ) -> Result<Vec<String>> {
        record::check_separator(new_value)?;

        let mut fields = self.read_line(line_number)?.ok_or_else(|| {
            Error::corruption(format!(
                "no record at line {} of {:?}",
                line_number, self.path
            ))
        })?;

        if field_index >= fields.len() {
            return Err(Error::corruption(format!(
                "field index {} out of range for record at line {} of {:?}",
                field_index, line_number, self.path
            )));
        }

        fields[field_index] = new_value.to_string();
        self.rewrite_slot(line_number, &encode_record(&fields)?)?;

        Ok(fields)
    }

    /// Overwrite the slot at `line_number` with the tombstone marker.
    ///
    /// The slot stays occupied; the file never shrinks.
    pub fn mark_tombstone(&self, line_number: u64) -> Result<()> {
        self.rewrite_slot(line_number, &record::tombstone_line())
    }

    /// Sequentially scan all live records, skipping tombstoned slots.
    ///
    /// A missing file yields an empty scan. Each item carries the
    /// record's line number so callers can re-address slots.
    pub fn scan(&self) -> Result<RecordScan> {
        let reader = match File::open(&self.path) {
            Ok(f) => Some(BufReader::new(f)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(RecordScan {
            reader,
            next_line: 0,
        })
    }

    // Seek to a slot and rewrite it with an already-encoded full-width line.
    fn rewrite_slot(&self, line_number: u64, line: &str) -> Result<()> {
        debug_assert_eq!(line.len(), RECORD_WIDTH);

        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let end = file.metadata()?.len();
        let offset = line_number * RECORD_WIDTH as u64;
        if offset >= end {
            return Err(Error::corruption(format!(
                "no record at line {} of {:?}",
                line_number, self.path
            )));
        }

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Iterator over a data file's live records in on-disk order.
pub struct RecordScan {
    reader: Option<BufReader<File>>,
    next_line: u64,
}

impl Iterator for RecordScan {
    type Item = Result<(u64, Vec<String>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            let line_number = self.next_line;
            let mut buf = vec![0u8; RECORD_WIDTH];
            let n = match read_full(reader, &mut buf) {
                Ok(n) => n,
                Err(e) => return Some(Err(e)),
            };
            if n == 0 {
                return None;
            }
            if n < RECORD_WIDTH {
                // Trailing partial slot; the file was left mid-write.
                log::warn!(
                    "ignoring {} trailing bytes after line {} (partial slot)",
                    n,
                    line_number
                );
                return None;
            }
            self.next_line += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(s) => s,
                Err(e) => {
                    return Some(Err(Error::corruption(format!(
                        "non-UTF-8 record at line {}: {}",
                        line_number, e
                    ))))
                }
            };
            let fields = decode_record(line);
            if is_tombstone(&fields) {
                continue;
            }
            return Some(Ok((line_number, fields)));
        }
    }
}

// Read until the buffer is full or EOF, returning the bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
