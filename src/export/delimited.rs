//! Comma-delimited text export.
//!
//! UTF-8 with a byte-order mark so spreadsheet readers pick the right
//! encoding for Thai text. A field is quoted, with inner quotes doubled,
//! only when it contains a comma, a double quote or a line break.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::{ExportRow, HEADERS};
use crate::error::{AppError, Result};

/// UTF-8 byte-order mark.
pub const BOM: &[u8] = "\u{FEFF}".as_bytes();

/// Serialize rows to CSV bytes: BOM, header line, one line per row.
pub fn to_delimited_text(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BOM.to_vec());

    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }

    writer.into_inner().map_err(|e| AppError::Io(e.into_error()))
}
