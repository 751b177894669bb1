//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Period selection is malformed (month out of range, implausible year)
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Remote summary source failed or returned something unreadable
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Rasterizer could not produce an image of the report
    #[error("Export render failure: {0}")]
    ExportRenderFailure(String),

    /// No renderable surface available at export time
    #[error("Export target not found: {0}")]
    ExportTargetNotFound(String),

    /// Surface exists but has not been laid out yet
    #[error("Export not ready: {0}")]
    ExportNotReady(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Excel export error
    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data parsing error
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create an invalid period error with message
    pub fn invalid_period(msg: impl Into<String>) -> Self {
        Self::InvalidPeriod(msg.into())
    }

    /// Create an upstream error with message
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Create a render failure with message
    pub fn render_failure(msg: impl Into<String>) -> Self {
        Self::ExportRenderFailure(msg.into())
    }

    /// Create a target-not-found error with message
    pub fn target_not_found(msg: impl Into<String>) -> Self {
        Self::ExportTargetNotFound(msg.into())
    }

    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a not-ready error with message
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::ExportNotReady(msg.into())
    }

    /// Whether this error belongs to the export pipeline.
    pub fn is_export_failure(&self) -> bool {
        matches!(
            self,
            Self::ExportRenderFailure(_)
                | Self::ExportTargetNotFound(_)
                | Self::ExportNotReady(_)
                | Self::Csv(_)
                | Self::Xlsx(_)
        )
    }

    /// Localized message shown to the user when an export fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ExportTargetNotFound(_) => "ไม่พบข้อมูลที่จะ Export กรุณาลองใหม่อีกครั้ง",
            Self::ExportNotReady(_) => "ข้อมูลยังไม่พร้อม กรุณารอสักครู่แล้วลองใหม่",
            _ => "เกิดข้อผิดพลาดในการ Export กรุณาลองใหม่อีกครั้ง",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_missing_target() {
        let err = AppError::target_not_found("report");
        assert_eq!(err.user_message(), "ไม่พบข้อมูลที่จะ Export กรุณาลองใหม่อีกครั้ง");
        assert!(err.is_export_failure());
    }

    #[test]
    fn test_user_message_for_invisible_surface() {
        let err = AppError::not_ready("report");
        assert_eq!(err.user_message(), "ข้อมูลยังไม่พร้อม กรุณารอสักครู่แล้วลองใหม่");
        assert!(err.is_export_failure());
    }

    #[test]
    fn test_user_message_ignores_render_failure_wording() {
        let err = AppError::render_failure("surface not visible");
        assert_eq!(err.user_message(), "เกิดข้อผิดพลาดในการ Export กรุณาลองใหม่อีกครั้ง");
    }

    #[test]
    fn test_upstream_is_not_export_failure() {
        assert!(!AppError::upstream("timeout").is_export_failure());
    }
}
