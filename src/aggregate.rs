//! Attendance aggregation: totals, status groups, per-day and monthly series.
//!
//! Every pass recomputes from the full input. Percentages everywhere use
//! [`percentage`], which rounds half up and treats an empty total as 0%.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::locale::{format_month_short, status_label};
use crate::models::{AttendanceRecord, DaySummary, ResolvedInterval, Status};

/// Number of months kept in an employee trend series.
pub const TREND_MONTHS: usize = 6;
/// Number of records kept in an employee activity log.
pub const RECENT_RECORDS: usize = 30;

/// `part / total` as a whole percent, rounded half up; `0` when `total == 0`.
pub fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (u64::from(part), u64::from(total));
    ((part * 200 + total) / (total * 2)) as u32
}

/// Counts per status and their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub present: u32,
    pub leave: u32,
    pub not_reported: u32,
    pub total: u32,
}

impl Totals {
    pub fn add(&mut self, status: Status, n: u32) {
        match status {
            Status::Present => self.present = self.present.saturating_add(n),
            Status::Leave => self.leave = self.leave.saturating_add(n),
            Status::NotReported => self.not_reported = self.not_reported.saturating_add(n),
        }
        self.total = self.total.saturating_add(n);
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add(record.status, 1);
        }
        totals
    }

    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a DaySummary>) -> Self {
        let mut totals = Self::default();
        for summary in summaries {
            for status in Status::ALL {
                totals.add(status, summary.count(status));
            }
        }
        totals
    }

    pub fn count(&self, status: Status) -> u32 {
        match status {
            Status::Present => self.present,
            Status::Leave => self.leave,
            Status::NotReported => self.not_reported,
        }
    }

    pub fn percentage(&self, status: Status) -> u32 {
        percentage(self.count(status), self.total)
    }
}

/// Employee names partitioned by status, in first-seen order.
///
/// Anonymous records (summary-only data) keep their slot as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusGroups {
    pub present: Vec<Option<String>>,
    pub leave: Vec<Option<String>>,
    pub not_reported: Vec<Option<String>>,
}

impl StatusGroups {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut groups = Self::default();
        for record in records {
            groups.group_mut(record.status).push(record.employee_id.clone());
        }
        groups
    }

    pub fn group(&self, status: Status) -> &[Option<String>] {
        match status {
            Status::Present => &self.present,
            Status::Leave => &self.leave,
            Status::NotReported => &self.not_reported,
        }
    }

    fn group_mut(&mut self, status: Status) -> &mut Vec<Option<String>> {
        match status {
            Status::Present => &mut self.present,
            Status::Leave => &mut self.leave,
            Status::NotReported => &mut self.not_reported,
        }
    }
}

/// Sort direction of per-day rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayOrder {
    /// Oldest first, for trend charts.
    Ascending,
    /// Most recent first, for list display.
    #[default]
    Descending,
}

/// One `DaySummary` per distinct date in `records`.
pub fn per_day_summaries<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    order: DayOrder,
) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    for record in records {
        days.entry(record.date)
            .or_insert_with(|| DaySummary::new(record.date))
            .bump(record.status);
    }

    let mut summaries: Vec<_> = days.into_values().collect();
    if order == DayOrder::Descending {
        summaries.reverse();
    }
    summaries
}

/// Present rate of one employee for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRate {
    pub year: i32,
    /// Zero-based month.
    pub month: u32,
    pub label: String,
    pub present: u32,
    pub total: u32,
    pub percentage: u32,
}

impl MonthlyRate {
    /// Sortable `YYYY-MM` key.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month + 1)
    }
}

/// Monthly present rate of `employee`, at most the last [`TREND_MONTHS`] months, oldest first.
pub fn per_employee_monthly<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    employee: &str,
) -> Vec<MonthlyRate> {
    let mut months: BTreeMap<(i32, u32), (u32, u32)> = BTreeMap::new();
    for record in records.into_iter().filter(|r| r.employee() == Some(employee)) {
        let bucket = months.entry((record.date.year(), record.date.month0())).or_default();
        bucket.1 += 1;
        if record.status == Status::Present {
            bucket.0 += 1;
        }
    }

    let skip = months.len().saturating_sub(TREND_MONTHS);
    months
        .into_iter()
        .skip(skip)
        .map(|((year, month), (present, total))| MonthlyRate {
            year,
            month,
            label: format_month_short(year, month),
            present,
            total,
            percentage: percentage(present, total),
        })
        .collect()
}

/// Monthly series of one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTrend {
    pub employee: String,
    pub months: Vec<MonthlyRate>,
}

/// Everything the dashboard derives from one record set and interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub totals: Totals,
    pub by_status: StatusGroups,
    pub per_day: Vec<DaySummary>,
    /// Named employees in first-seen order.
    pub per_employee_monthly: Vec<EmployeeTrend>,
}

/// Aggregate records within `interval`, per-day rows most recent first.
pub fn aggregate(records: &[AttendanceRecord], interval: &ResolvedInterval) -> Aggregate {
    aggregate_with(records, interval, DayOrder::Descending)
}

/// Aggregate records within `interval` with an explicit per-day order.
pub fn aggregate_with(records: &[AttendanceRecord], interval: &ResolvedInterval, order: DayOrder) -> Aggregate {
    let included: Vec<&AttendanceRecord> = records.iter().filter(|r| interval.contains(r.date)).collect();

    let mut seen = HashSet::new();
    let employees: Vec<&str> = included
        .iter()
        .filter_map(|r| r.employee())
        .filter(|name| seen.insert(*name))
        .collect();

    let trends = employees
        .into_iter()
        .map(|employee| EmployeeTrend {
            employee: employee.to_string(),
            months: per_employee_monthly(included.iter().copied(), employee),
        })
        .collect();

    Aggregate {
        totals: Totals::from_records(included.iter().copied()),
        by_status: StatusGroups::from_records(included.iter().copied()),
        per_day: per_day_summaries(included.iter().copied(), order),
        per_employee_monthly: trends,
    }
}

/// Totals over the summaries that fall within `interval`.
pub fn totals_from_summaries(summaries: &[DaySummary], interval: &ResolvedInterval) -> Totals {
    Totals::from_summaries(summaries.iter().filter(|s| interval.contains(s.date)))
}

fn exceeds_roster(summary: &DaySummary, roster_size: usize) -> bool {
    summary.total() as usize > roster_size
}

/// Count summaries whose population exceeds the roster, logging each one.
///
/// Oversized days point at upstream data corruption and are not rejected.
pub fn check_roster(summaries: &[DaySummary], roster_size: usize) -> usize {
    summaries
        .iter()
        .filter(|summary| {
            let oversized = exceeds_roster(summary, roster_size);
            if oversized {
                warn!(
                    "Summary for {} reports {} people, roster has {}",
                    summary.date,
                    summary.total(),
                    roster_size
                );
            }
            oversized
        })
        .count()
}

/// Expand summaries into anonymous records, skipping days larger than the roster.
///
/// Counts of an oversized day are not trustworthy and could be arbitrarily
/// large, so such a day contributes no rows.
pub fn expand_summaries(summaries: &[DaySummary], roster_size: usize) -> Vec<AttendanceRecord> {
    summaries
        .iter()
        .filter(|summary| {
            let keep = !exceeds_roster(summary, roster_size);
            if !keep {
                debug!("Not expanding oversized summary for {}", summary.date);
            }
            keep
        })
        .flat_map(DaySummary::expand)
        .collect()
}

/// `"<n> เข้างาน <n> ลา <n> ไม่ระบุงาน"`, omitting zero counts.
pub fn status_text(summary: &DaySummary) -> String {
    Status::ALL
        .into_iter()
        .filter(|status| summary.count(*status) > 0)
        .map(|status| format!("{} {}", summary.count(status), status_label(status)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Statistics of one employee over a record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeStats {
    pub employee: String,
    pub totals: Totals,
    /// Most recent first, at most [`RECENT_RECORDS`].
    pub recent: Vec<AttendanceRecord>,
    /// Total number of matching records before truncation.
    pub record_count: usize,
}

pub fn employee_stats(records: &[AttendanceRecord], employee: &str) -> EmployeeStats {
    let mut own: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| r.employee() == Some(employee))
        .cloned()
        .collect();
    let totals = Totals::from_records(&own);
    let record_count = own.len();

    // Stable sort keeps input order among records of the same date.
    own.sort_by(|a, b| b.date.cmp(&a.date));
    own.truncate(RECENT_RECORDS);

    EmployeeStats {
        employee: employee.to_string(),
        totals,
        recent: own,
        record_count,
    }
}

/// Short overview of a record set about to be exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub total_records: usize,
    pub totals: Totals,
    /// Distinct departments in first-seen order.
    pub departments: Vec<String>,
    /// Dates of the first and last record, in sequence order.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl SummaryReport {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let mut seen = HashSet::new();
        let departments = records
            .iter()
            .filter_map(|r| r.department.as_deref())
            .filter(|d| seen.insert(*d))
            .map(str::to_string)
            .collect();

        Self {
            total_records: records.len(),
            totals: Totals::from_records(records),
            departments,
            date_range: records.first().zip(records.last()).map(|(a, b)| (a.date, b.date)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodSelection;
    use crate::period::resolve;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(d: NaiveDate, name: &str, status: Status) -> AttendanceRecord {
        AttendanceRecord::new(d, Some(name.to_string()), status)
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(4, 4), 100);
    }

    #[test]
    fn test_empty_totals_percentages_are_zero() {
        let totals = Totals::default();
        for status in Status::ALL {
            assert_eq!(totals.percentage(status), 0);
        }
    }

    #[test]
    fn test_month_range_end_to_end() {
        let interval = resolve(&PeriodSelection::MonthRange {
            year: 2025,
            from_month: 0,
            to_month: 1,
        })
        .unwrap();
        let records = vec![
            rec(date(2025, 1, 15), "A", Status::Present),
            rec(date(2025, 2, 28), "A", Status::Leave),
            rec(date(2025, 3, 1), "A", Status::Present),
        ];

        let result = aggregate(&records, &interval);
        assert_eq!(
            result.totals,
            Totals {
                present: 1,
                leave: 1,
                not_reported: 0,
                total: 2
            }
        );
        assert_eq!(result.per_day.len(), 2);
        assert_eq!(result.per_day[0].date, date(2025, 2, 28));
    }

    #[test]
    fn test_totals_from_summaries_reconcile() {
        let summaries = vec![
            DaySummary {
                date: date(2025, 1, 1),
                present: 5,
                leave: 2,
                not_reported: 1,
            },
            DaySummary {
                date: date(2025, 1, 2),
                present: 6,
                leave: 0,
                not_reported: 3,
            },
        ];
        let totals = Totals::from_summaries(&summaries);
        assert_eq!(totals.present, 11);
        assert_eq!(totals.leave, 2);
        assert_eq!(totals.not_reported, 4);
        assert_eq!(totals.total, 17);

        let expanded: Vec<_> = summaries.iter().flat_map(DaySummary::expand).collect();
        assert_eq!(Totals::from_records(&expanded), totals);
    }

    #[test]
    fn test_totals_from_summaries_respects_interval() {
        let interval = resolve(&PeriodSelection::Day { date: date(2025, 1, 2) }).unwrap();
        let summaries = vec![
            DaySummary {
                date: date(2025, 1, 1),
                present: 5,
                leave: 0,
                not_reported: 0,
            },
            DaySummary {
                date: date(2025, 1, 2),
                present: 1,
                leave: 1,
                not_reported: 0,
            },
        ];
        assert_eq!(totals_from_summaries(&summaries, &interval).total, 2);
    }

    #[test]
    fn test_status_groups_first_seen_order_without_dedup() {
        let d = date(2025, 1, 1);
        let records = vec![
            rec(d, "B", Status::Present),
            rec(d, "A", Status::Leave),
            rec(d, "C", Status::Present),
            rec(d, "B", Status::Present),
            AttendanceRecord::new(d, None, Status::NotReported),
        ];
        let groups = StatusGroups::from_records(&records);

        assert_eq!(
            groups.present,
            [Some("B".to_string()), Some("C".to_string()), Some("B".to_string())]
        );
        assert_eq!(groups.group(Status::Leave), [Some("A".to_string())]);
        assert_eq!(groups.not_reported, [None]);
    }

    #[test]
    fn test_per_day_order_is_a_parameter() {
        let records = vec![
            rec(date(2025, 1, 3), "A", Status::Present),
            rec(date(2025, 1, 1), "A", Status::Leave),
            rec(date(2025, 1, 3), "B", Status::NotReported),
        ];

        let asc = per_day_summaries(&records, DayOrder::Ascending);
        assert_eq!(asc[0].date, date(2025, 1, 1));
        assert_eq!(asc[1].present, 1);
        assert_eq!(asc[1].not_reported, 1);

        let desc = per_day_summaries(&records, DayOrder::Descending);
        assert_eq!(desc[0].date, date(2025, 1, 3));
        assert_eq!(desc.len(), 2);
    }

    #[test]
    fn test_per_employee_monthly_keeps_last_six() {
        let mut records = Vec::new();
        for month in 1..=8 {
            records.push(rec(date(2024, month, 1), "A", Status::Present));
            records.push(rec(date(2024, month, 2), "A", Status::Leave));
            records.push(rec(date(2024, month, 3), "B", Status::Leave));
        }
        records.push(rec(date(2024, 8, 4), "A", Status::Present));

        let series = per_employee_monthly(&records, "A");
        assert_eq!(series.len(), TREND_MONTHS);
        assert_eq!(series[0].key(), "2024-03");
        assert_eq!(series[5].key(), "2024-08");
        assert_eq!(series[0].percentage, 50);
        assert_eq!(series[5].present, 2);
        assert_eq!(series[5].total, 3);
        assert_eq!(series[5].percentage, 67);
        assert_eq!(series[5].label, "ส.ค. 2567");
    }

    #[test]
    fn test_per_employee_monthly_sorts_across_years() {
        let records = vec![
            rec(date(2025, 1, 5), "A", Status::Present),
            rec(date(2024, 12, 5), "A", Status::Present),
        ];
        let keys: Vec<_> = per_employee_monthly(&records, "A").iter().map(MonthlyRate::key).collect();
        assert_eq!(keys, ["2024-12", "2025-01"]);
    }

    #[test]
    fn test_aggregate_trends_for_named_employees() {
        let interval = resolve(&PeriodSelection::Year { year: 2025 }).unwrap();
        let records = vec![
            rec(date(2025, 1, 1), "B", Status::Present),
            AttendanceRecord::new(date(2025, 1, 1), None, Status::Present),
            rec(date(2025, 1, 2), "A", Status::Leave),
            rec(date(2025, 2, 1), "B", Status::Leave),
        ];
        let result = aggregate_with(&records, &interval, DayOrder::Ascending);
        let names: Vec<_> = result.per_employee_monthly.iter().map(|t| t.employee.as_str()).collect();

        assert_eq!(names, ["B", "A"]);
        assert_eq!(result.per_employee_monthly[0].months.len(), 2);
        assert_eq!(result.per_day[0].date, date(2025, 1, 1));
        assert_eq!(result.totals.total, 4);
    }

    #[test]
    fn test_empty_period() {
        let interval = resolve(&PeriodSelection::month(2025, 5)).unwrap();
        let result = aggregate(&[], &interval);
        assert_eq!(result.totals.total, 0);
        assert!(result.per_day.is_empty());
        assert_eq!(result.totals.percentage(Status::Present), 0);
    }

    #[test]
    fn test_check_roster() {
        let mut big = DaySummary::new(date(2025, 1, 1));
        big.present = 10;
        let mut small = DaySummary::new(date(2025, 1, 2));
        small.leave = 3;
        assert_eq!(check_roster(&[big, small], 9), 1);
    }

    #[test]
    fn test_corrupt_counts_saturate() {
        let body = r#"{"data":{"date":"2025-01-01","present":4294967295,"leave":1,"notReported":0}}"#;
        let summary = crate::client::parse_day_summary(body).unwrap().unwrap();

        assert_eq!(summary.total(), u32::MAX);
        assert_eq!(check_roster(&[summary], 9), 1);

        let mut other = DaySummary::new(date(2025, 1, 2));
        other.present = 3_000_000_000;
        let mut again = DaySummary::new(date(2025, 1, 3));
        again.present = 3_000_000_000;
        let totals = Totals::from_summaries(&[summary, other, again]);

        assert_eq!(totals.present, u32::MAX);
        assert_eq!(totals.total, u32::MAX);
        assert_eq!(totals.percentage(Status::Present), 100);
    }

    #[test]
    fn test_expand_summaries_skips_oversized_days() {
        let mut corrupt = DaySummary::new(date(2025, 1, 1));
        corrupt.present = 4_000_000_000;
        let mut normal = DaySummary::new(date(2025, 1, 2));
        normal.present = 7;
        normal.leave = 2;

        let records = expand_summaries(&[corrupt, normal], 9);

        assert_eq!(records.len(), 9);
        assert!(records.iter().all(|r| r.date == date(2025, 1, 2)));
    }

    #[test]
    fn test_status_text_omits_zero_parts() {
        let summary = DaySummary {
            date: date(2025, 1, 1),
            present: 7,
            leave: 0,
            not_reported: 2,
        };
        assert_eq!(status_text(&summary), "7 เข้างาน 2 ไม่ระบุงาน");
        assert_eq!(status_text(&DaySummary::new(date(2025, 1, 1))), "");
    }

    #[test]
    fn test_employee_stats_recent_first_and_truncated() {
        let mut records = Vec::new();
        for day in 1..=31 {
            records.push(rec(date(2025, 1, day), "A", Status::Present));
        }
        records.push(rec(date(2025, 2, 1), "A", Status::Leave));
        records.push(rec(date(2025, 2, 1), "B", Status::Leave));

        let stats = employee_stats(&records, "A");
        assert_eq!(stats.record_count, 32);
        assert_eq!(stats.recent.len(), RECENT_RECORDS);
        assert_eq!(stats.recent[0].date, date(2025, 2, 1));
        assert_eq!(stats.totals.present, 31);
        assert_eq!(stats.totals.percentage(Status::Leave), 3);
    }

    #[test]
    fn test_summary_report() {
        let records = vec![
            rec(date(2025, 1, 3), "A", Status::Present).with_department("IT"),
            rec(date(2025, 1, 1), "B", Status::Leave),
            rec(date(2025, 1, 2), "C", Status::NotReported).with_department("HR"),
            rec(date(2025, 1, 2), "D", Status::Present).with_department("IT"),
        ];
        let report = SummaryReport::from_records(&records);

        assert_eq!(report.total_records, 4);
        assert_eq!(report.totals.present, 2);
        assert_eq!(report.departments, ["IT", "HR"]);
        assert_eq!(report.date_range, Some((date(2025, 1, 3), date(2025, 1, 2))));
        assert_eq!(SummaryReport::from_records(&[]).date_range, None);
    }
}
