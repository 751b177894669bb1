//! Attendance records, day summaries and the person-view wire shape.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Attendance status of one employee on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Present,
    Leave,
    NotReported,
}

impl Status {
    /// All statuses in display order.
    pub const ALL: [Status; 3] = [Status::Present, Status::Leave, Status::NotReported];

    /// Wire code used by the summary API.
    pub fn code(self) -> &'static str {
        match self {
            Status::Present => "present",
            Status::Leave => "leave",
            Status::NotReported => "not_reported",
        }
    }

    /// Parse a wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

/// One employee's attendance on one date, as produced by the external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    /// `None` for records synthesized from summary-only data.
    pub employee_id: Option<String>,
    pub status: Status,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub department: Option<String>,
    pub reason: Option<String>,
}

impl AttendanceRecord {
    /// Record with only the mandatory fields set.
    pub fn new(date: NaiveDate, employee_id: Option<String>, status: Status) -> Self {
        Self {
            date,
            employee_id,
            status,
            check_in: None,
            check_out: None,
            department: None,
            reason: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_times(mut self, check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> Self {
        self.check_in = check_in;
        self.check_out = check_out;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn employee(&self) -> Option<&str> {
        self.employee_id.as_deref()
    }
}

/// Present/leave/not-reported counts for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    #[serde(default)]
    pub present: u32,
    #[serde(default)]
    pub leave: u32,
    #[serde(default)]
    pub not_reported: u32,
}

impl DaySummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            present: 0,
            leave: 0,
            not_reported: 0,
        }
    }

    /// Total reporting population of the day, saturating on corrupt counts.
    pub fn total(&self) -> u32 {
        self.present.saturating_add(self.leave).saturating_add(self.not_reported)
    }

    pub fn count(&self, status: Status) -> u32 {
        match status {
            Status::Present => self.present,
            Status::Leave => self.leave,
            Status::NotReported => self.not_reported,
        }
    }

    pub(crate) fn bump(&mut self, status: Status) {
        match status {
            Status::Present => self.present = self.present.saturating_add(1),
            Status::Leave => self.leave = self.leave.saturating_add(1),
            Status::NotReported => self.not_reported = self.not_reported.saturating_add(1),
        }
    }

    /// Expand the counts into anonymous records, grouped by status.
    ///
    /// Allocates one record per count; check the total against the roster first
    /// (see `aggregate::expand_summaries`).
    pub fn expand(&self) -> Vec<AttendanceRecord> {
        Status::ALL
            .into_iter()
            .flat_map(|status| {
                (0..self.count(status)).map(move |_| AttendanceRecord::new(self.date, None, status))
            })
            .collect()
    }
}

/// Person-view item as returned by `route=person`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonItem {
    pub date: NaiveDate,
    #[serde(default)]
    pub team: Option<String>,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, rename = "checkIn")]
    pub check_in: Option<NaiveTime>,
    #[serde(default, rename = "checkOut")]
    pub check_out: Option<NaiveTime>,
}

impl From<PersonItem> for AttendanceRecord {
    fn from(item: PersonItem) -> Self {
        Self {
            date: item.date,
            employee_id: Some(item.name),
            status: item.status,
            check_in: item.check_in,
            check_out: item.check_out,
            department: item.team.filter(|t| !t.trim().is_empty()),
            reason: item.reason.filter(|r| !r.trim().is_empty()),
        }
    }
}
