//! Excel workbook export.

use rust_xlsxwriter::{Color, DocProperties, ExcelDateTime, Format, FormatBorder, Workbook, XlsxError};

use super::{ExportRow, HEADERS};
use crate::error::Result;

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "รายงานการเข้างาน";

/// Column width hints, in [`HEADERS`] order.
pub const COLUMN_WIDTHS: [f64; 7] = [15.0, 20.0, 15.0, 15.0, 15.0, 15.0, 25.0];

/// Serialize rows to an in-memory `.xlsx` workbook.
///
/// The document creation time is pinned so identical rows give identical bytes.
pub fn to_workbook(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(rows)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(rows: &[ExportRow]) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();

    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    // Data rows
    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        for (col, value) in row.fields().iter().enumerate() {
            worksheet.write_string(excel_row, col as u16, value)?;
        }
    }

    // Autofilter
    if !rows.is_empty() {
        worksheet.autofilter(0, 0, rows.len() as u32, (HEADERS.len() - 1) as u16)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    Ok(workbook)
}
