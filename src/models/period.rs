//! Period selections and resolved date intervals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User's choice of reporting window.
///
/// Months are zero-based (`0` = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PeriodSelection {
    Day {
        date: NaiveDate,
    },
    #[serde(rename_all = "camelCase")]
    MonthRange {
        year: i32,
        from_month: u32,
        to_month: u32,
    },
    Year {
        year: i32,
    },
}

impl PeriodSelection {
    /// Single calendar month.
    pub fn month(year: i32, month: u32) -> Self {
        Self::MonthRange {
            year,
            from_month: month,
            to_month: month,
        }
    }

    /// Period noun shown next to the label.
    pub fn period_name(&self) -> &'static str {
        match self {
            Self::Day { .. } => "วัน",
            Self::MonthRange { .. } => "เดือน",
            Self::Year { .. } => "ปี",
        }
    }
}

/// Concrete closed date interval derived from a period selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInterval {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub label: String,
}

impl ResolvedInterval {
    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of calendar days covered.
    pub fn num_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn is_single_day(&self) -> bool {
        self.from == self.to
    }
}

/// Range granularity of a person-view query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonRange {
    Day,
    Month,
    Year,
}

impl PersonRange {
    /// Query-string value for `range=`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}
