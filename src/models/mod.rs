//! Data models for attendance records, summaries and reporting periods.

pub mod attendance;
pub mod period;

pub use attendance::{AttendanceRecord, DaySummary, PersonItem, Status};
pub use period::{PeriodSelection, PersonRange, ResolvedInterval};
