//! Export pipeline: CSV, Excel workbook and paginated document.
//!
//! All three consume the currently displayed, already filtered record set.
//! Row order is the caller's; nothing here re-sorts.

pub mod delimited;
pub mod document;
pub mod xlsx;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::locale::status_label;
use crate::models::{AttendanceRecord, Status};

pub use self::delimited::to_delimited_text;
pub use self::document::{export_document, DocumentEncoder, PageLayout, PaginatedDocument, Rasterizer, RenderTarget};
pub use self::xlsx::to_workbook;

/// Column headers shared by every tabular export, in column order.
pub const HEADERS: [&str; 7] = [
    "วันที่",
    "ชื่อพนักงาน",
    "สถานะ",
    "แผนก",
    "เวลาเข้า",
    "เวลาออก",
    "หมายเหตุ",
];

/// Placeholder for missing optional fields.
pub const MISSING: &str = "-";

/// Export-facing projection of an attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub employee: Option<String>,
    pub status: Status,
    pub department: Option<String>,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub reason: Option<String>,
}

impl ExportRow {
    pub fn status_label(&self) -> &'static str {
        status_label(self.status)
    }

    /// Cell values in [`HEADERS`] order.
    pub fn fields(&self) -> [String; 7] {
        [
            self.date.format("%Y-%m-%d").to_string(),
            text_or_dash(self.employee.as_deref()),
            self.status_label().to_string(),
            text_or_dash(self.department.as_deref()),
            time_or_dash(self.check_in),
            time_or_dash(self.check_out),
            collapse_newlines(&text_or_dash(self.reason.as_deref())),
        ]
    }
}

impl From<&AttendanceRecord> for ExportRow {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            date: record.date,
            employee: record.employee_id.clone(),
            status: record.status,
            department: record.department.clone(),
            check_in: record.check_in,
            check_out: record.check_out,
            reason: record.reason.clone(),
        }
    }
}

/// Project records into export rows, keeping their order.
pub fn rows_from_records(records: &[AttendanceRecord]) -> Vec<ExportRow> {
    records.iter().map(ExportRow::from).collect()
}

fn text_or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

fn time_or_dash(value: Option<NaiveTime>) -> String {
    value.map_or_else(|| MISSING.to_string(), |t| t.format("%H:%M").to_string())
}

/// Replace each `\r\n`, `\n` or `\r` with a single space.
fn collapse_newlines(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

/// `<prefix>_<YYYY-MM-DDTHH-MM-SS>.<ext>` for a given instant.
pub fn export_filename_at(prefix: &str, format: ExportFormat, at: NaiveDateTime) -> String {
    format!(
        "{prefix}_{ts}.{ext}",
        ts = at.format("%Y-%m-%dT%H-%M-%S"),
        ext = format.extension()
    )
}

/// Generate default filename for export, stamped with the current UTC time.
pub fn generate_export_filename(prefix: &str, format: ExportFormat) -> String {
    export_filename_at(prefix, format, Utc::now().naive_utc())
}

/// Write a finished export into `dir` and return its path.
///
/// The payload is fully built before anything touches the disk, so a failed
/// export never leaves a partial file behind.
pub fn save_export(bytes: &[u8], dir: &Path, prefix: &str, format: ExportFormat) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(generate_export_filename(prefix, format));
    std::fs::write(&path, bytes)?;
    info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

/// Serialize records to CSV or Excel and save them into `dir`.
pub fn export_records(
    records: &[AttendanceRecord],
    format: ExportFormat,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    let rows = rows_from_records(records);
    let bytes = match format {
        ExportFormat::Csv => to_delimited_text(&rows)?,
        ExportFormat::Xlsx => to_workbook(&rows)?,
        ExportFormat::Pdf => {
            return Err(AppError::target_not_found(
                "document export needs a rendered report surface",
            ));
        }
    };
    save_export(&bytes, dir, prefix, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fields_use_dash_for_missing_values() {
        let record = AttendanceRecord::new(date(2025, 1, 1), None, Status::NotReported).with_department("  ");
        let fields = ExportRow::from(&record).fields();
        assert_eq!(fields, ["2025-01-01", "-", "ไม่ระบุงาน", "-", "-", "-", "-"]);
    }

    #[test]
    fn test_fields_format_times_and_reason() {
        let record = AttendanceRecord::new(date(2025, 1, 1), Some("A".into()), Status::Present)
            .with_times(NaiveTime::from_hms_opt(8, 5, 0), NaiveTime::from_hms_opt(17, 30, 59))
            .with_reason("line one\r\nline two\nthree\rfour");
        let fields = ExportRow::from(&record).fields();
        assert_eq!(fields[4], "08:05");
        assert_eq!(fields[5], "17:30");
        assert_eq!(fields[6], "line one line two three four");
    }

    #[test]
    fn test_export_filename() {
        let at = date(2025, 1, 2).and_hms_opt(3, 4, 5).unwrap();
        assert_eq!(
            export_filename_at("attendance_report", ExportFormat::Csv, at),
            "attendance_report_2025-01-02T03-04-05.csv"
        );
        assert!(generate_export_filename("x", ExportFormat::Xlsx).ends_with(".xlsx"));
    }

    #[test]
    fn test_export_records_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![AttendanceRecord::new(date(2025, 1, 1), Some("A".into()), Status::Present)];

        let path = export_records(&records, ExportFormat::Csv, dir.path(), "report").unwrap();
        let bytes = std::fs::read(&path).unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("report_"));
        assert!(bytes.starts_with(delimited::BOM));
    }

    #[test]
    fn test_export_records_pdf_needs_surface() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_records(&[], ExportFormat::Pdf, dir.path(), "report").unwrap_err();
        assert!(matches!(err, AppError::ExportTargetNotFound(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
