//! Period resolution: period selection → closed date interval + label.
//!
//! A month range whose `from_month` is later than its `to_month` rolls over
//! into the following year (October to March means October of `year` through
//! March of `year + 1`). The resolver is the only place this is decided;
//! the record filter works from the resolved interval.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::locale::{buddhist_year, format_date_long, month_name};
use crate::models::{PeriodSelection, PersonRange, ResolvedInterval};

/// Smallest accepted year.
pub const MIN_YEAR: i32 = 1000;
/// Largest accepted year.
pub const MAX_YEAR: i32 = 9999;

/// Resolve a period selection into a concrete interval.
pub fn resolve(selection: &PeriodSelection) -> Result<ResolvedInterval> {
    let interval = match *selection {
        PeriodSelection::Day { date } => {
            check_year(date.year())?;
            ResolvedInterval {
                from: date,
                to: date,
                label: format_date_long(date),
            }
        }
        PeriodSelection::Year { year } => {
            check_year(year)?;
            ResolvedInterval {
                from: first_day_of_month(year, 0)?,
                to: last_day_of_month(year, 11)?,
                label: buddhist_year(year).to_string(),
            }
        }
        PeriodSelection::MonthRange {
            year,
            from_month,
            to_month,
        } => {
            check_year(year)?;
            check_month(from_month)?;
            check_month(to_month)?;

            let to_year = if from_month > to_month { year + 1 } else { year };
            check_year(to_year)?;

            ResolvedInterval {
                from: first_day_of_month(year, from_month)?,
                to: last_day_of_month(to_year, to_month)?,
                label: month_range_label(year, from_month, to_year, to_month),
            }
        }
    };

    debug!(
        "Resolved {:?} to {}..={} ({})",
        selection, interval.from, interval.to, interval.label
    );
    Ok(interval)
}

/// First day of a zero-based month.
pub fn first_day_of_month(year: i32, month0: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .ok_or_else(|| AppError::invalid_period(format!("no month {month0} in {year}")))
}

/// Last day of a zero-based month: day 0 of the following month.
pub fn last_day_of_month(year: i32, month0: u32) -> Result<NaiveDate> {
    check_month(month0)?;
    let (next_year, next_month0) = if month0 == 11 { (year + 1, 0) } else { (year, month0 + 1) };
    first_day_of_month(next_year, next_month0)?
        .pred_opt()
        .ok_or_else(|| AppError::invalid_period(format!("no last day for month {month0} in {year}")))
}

/// Number of days in a zero-based month.
pub fn days_in_month(year: i32, month0: u32) -> Result<u32> {
    Ok(last_day_of_month(year, month0)?.day())
}

fn check_year(year: i32) -> Result<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(AppError::invalid_period(format!("year {year} is not a 4-digit year")))
    }
}

fn check_month(month0: u32) -> Result<()> {
    if month0 <= 11 {
        Ok(())
    } else {
        Err(AppError::invalid_period(format!("month index {month0} is outside 0..=11")))
    }
}

fn month_range_label(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> String {
    // Indices are validated by the caller.
    let from_name = month_name(from_month).unwrap_or_default();
    let to_name = month_name(to_month).unwrap_or_default();

    if from_year != to_year {
        format!(
            "{from_name} {} ถึง {to_name} {}",
            buddhist_year(from_year),
            buddhist_year(to_year)
        )
    } else if from_month == to_month {
        format!("{from_name} {}", buddhist_year(from_year))
    } else {
        format!("{from_name} ถึง {to_name} {}", buddhist_year(from_year))
    }
}

impl PeriodSelection {
    /// Selection of the given kind covering `today` (single day, current month, current year).
    pub fn current(range: PersonRange, today: NaiveDate) -> Self {
        match range {
            PersonRange::Day => Self::Day { date: today },
            PersonRange::Month => Self::month(today.year(), today.month0()),
            PersonRange::Year => Self::Year { year: today.year() },
        }
    }
}

impl PersonRange {
    /// Parse the `on=` reference of a person query into a selection.
    ///
    /// Accepted forms: `YYYY-MM-DD` (day), `YYYY-MM` (month), `YYYY` (year).
    pub fn selection(self, reference: &str) -> Result<PeriodSelection> {
        let reference = reference.trim();
        let invalid = || AppError::invalid_period(format!("bad {} reference '{reference}'", self.as_str()));

        match self {
            Self::Day => NaiveDate::parse_from_str(reference, "%Y-%m-%d")
                .map(|date| PeriodSelection::Day { date })
                .map_err(|_| invalid()),
            Self::Month => {
                let (year, month) = reference.split_once('-').ok_or_else(invalid)?;
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                if !(1..=12).contains(&month) {
                    return Err(invalid());
                }
                Ok(PeriodSelection::month(year, month - 1))
            }
            Self::Year => reference
                .parse::<i32>()
                .map(|year| PeriodSelection::Year { year })
                .map_err(|_| invalid()),
        }
    }

    /// Reference string for `date` at this granularity.
    pub fn reference_for(self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Year => date.format("%Y").to_string(),
        }
    }
}
