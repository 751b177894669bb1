//! Secondary record filters applied before aggregation and export.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, ResolvedInterval, Status};

/// Optional inclusive date bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_set(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| from <= date) && self.to.is_none_or(|to| date <= to)
    }
}

/// User-selected secondary filters. Empty fields mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub employees: HashSet<String>,
    #[serde(default)]
    pub statuses: HashSet<Status>,
    #[serde(default)]
    pub departments: HashSet<String>,
    #[serde(default)]
    pub search_term: String,
}

impl FilterState {
    /// Toggle an employee in or out of the selection.
    pub fn toggle_employee(&mut self, employee: &str) {
        if !self.employees.remove(employee) {
            self.employees.insert(employee.to_string());
        }
    }

    /// Toggle a status in or out of the selection.
    pub fn toggle_status(&mut self, status: Status) {
        if !self.statuses.remove(&status) {
            self.statuses.insert(status);
        }
    }

    /// Toggle a department in or out of the selection.
    pub fn toggle_department(&mut self, department: &str) {
        if !self.departments.remove(department) {
            self.departments.insert(department.to_string());
        }
    }

    /// Narrow the date range to the part that overlaps `interval`.
    pub fn restrict_to(&mut self, interval: &ResolvedInterval) {
        self.date_range.from = Some(self.date_range.from.map_or(interval.from, |f| f.max(interval.from)));
        self.date_range.to = Some(self.date_range.to.map_or(interval.to, |t| t.min(interval.to)));
    }

    fn search_needle(&self) -> Option<String> {
        let term = self.search_term.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    /// Number of filter dimensions currently restricting the result.
    pub fn active_count(&self) -> usize {
        [
            self.date_range.is_set(),
            !self.employees.is_empty(),
            !self.statuses.is_empty(),
            !self.departments.is_empty(),
            self.search_needle().is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Whether a single record passes every active filter.
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.matches_with(record, self.search_needle().as_deref())
    }

    fn matches_with(&self, record: &AttendanceRecord, needle: Option<&str>) -> bool {
        if !self.date_range.contains(record.date) {
            return false;
        }
        if !self.employees.is_empty() && !record.employee().is_some_and(|e| self.employees.contains(e)) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&record.status) {
            return false;
        }
        if !self.departments.is_empty()
            && !record.department.as_ref().is_some_and(|d| self.departments.contains(d))
        {
            return false;
        }
        if let Some(needle) = needle {
            return record
                .employee()
                .is_some_and(|name| name.to_lowercase().contains(needle));
        }
        true
    }
}

/// Apply `state` to `records`, preserving input order.
pub fn filter(records: &[AttendanceRecord], state: &FilterState) -> Vec<AttendanceRecord> {
    let needle = state.search_needle();
    records
        .iter()
        .filter(|record| state.matches_with(record, needle.as_deref()))
        .cloned()
        .collect()
}
