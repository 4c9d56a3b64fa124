//! Fixed-width record codec.
//!
//! Every line in a data file occupies exactly [`RECORD_WIDTH`] bytes:
//! the field values joined with `;`, right-padded with spaces to
//! `RECORD_WIDTH - 1` characters, plus a trailing newline. The fixed
//! width is what makes line numbers stable addresses: slot `n` always
//! starts at byte `n * RECORD_WIDTH`.

use crate::error::{Error, Result};

/// Total byte length of every data-file line, including the newline.
pub const RECORD_WIDTH: usize = 501;

/// Field separator within a record.
pub const SEPARATOR: char = ';';

/// Marker written over a logically deleted record's slot.
pub const TOMBSTONE: &str = "is_deleted";

/// Encode a field sequence into one fixed-width line.
///
/// Fails with [`Error::InvalidField`] if any field contains the
/// separator, and with [`Error::Corruption`] if the joined payload
/// would not fit in the slot (it would shift every following slot).
pub fn encode_record(fields: &[String]) -> Result<String> {
    for field in fields {
        check_separator(field)?;
    }

    let mut line = fields.join(";");
    if line.len() > RECORD_WIDTH - 1 {
        return Err(Error::corruption(format!(
            "record payload of {} bytes exceeds slot width {}",
            line.len(),
            RECORD_WIDTH - 1
        )));
    }

    // Pad by bytes, not characters: slot addressing is byte-based.
    line.push_str(&" ".repeat(RECORD_WIDTH - 1 - line.len()));
    line.push('\n');
    Ok(line)
}

/// Decode one stored line back into its field sequence.
///
/// Strips the trailing padding and newline, then splits on `;`.
/// No type coercion happens here; typed parsing belongs to the
/// entity codecs.
pub fn decode_record(line: &str) -> Vec<String> {
    line.trim_end()
        .split(SEPARATOR)
        .map(|s| s.to_string())
        .collect()
}

/// Whether a decoded field sequence is the tombstone marker.
pub fn is_tombstone(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0] == TOMBSTONE
}

/// The full-width line written over a deleted slot.
pub fn tombstone_line() -> String {
    let mut line = String::with_capacity(RECORD_WIDTH);
    line.push_str(TOMBSTONE);
    line.push_str(&" ".repeat(RECORD_WIDTH - 1 - TOMBSTONE.len()));
    line.push('\n');
    line
}

/// Reject a value containing the reserved separator.
pub fn check_separator(value: &str) -> Result<()> {
    if value.contains(SEPARATOR) {
        return Err(Error::invalid_field(format!(
            "value {:?} contains reserved separator {:?}",
            value, SEPARATOR
        )));
    }
    Ok(())
}
