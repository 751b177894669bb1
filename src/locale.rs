//! Thai calendar names, Buddhist-year display and the status lookup table.
//!
//! Everything here is presentation only. Date arithmetic elsewhere stays
//! Gregorian; [`buddhist_year`] must never feed back into comparisons.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::Status;

/// Offset between the Buddhist Era and the Gregorian year.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

const MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

const MONTHS_SHORT: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

/// Gregorian year → Buddhist Era year, for display.
pub fn buddhist_year(gregorian: i32) -> i32 {
    gregorian + BUDDHIST_ERA_OFFSET
}

/// Buddhist Era year → Gregorian year, for parsing user input.
pub fn gregorian_year(buddhist: i32) -> i32 {
    buddhist - BUDDHIST_ERA_OFFSET
}

/// Full month name for a zero-based month index.
pub fn month_name(month0: u32) -> Option<&'static str> {
    MONTHS.get(month0 as usize).copied()
}

/// Abbreviated month name for a zero-based month index.
pub fn month_name_short(month0: u32) -> Option<&'static str> {
    MONTHS_SHORT.get(month0 as usize).copied()
}

/// Full weekday name, e.g. `วันจันทร์`.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "วันจันทร์",
        Weekday::Tue => "วันอังคาร",
        Weekday::Wed => "วันพุธ",
        Weekday::Thu => "วันพฤหัสบดี",
        Weekday::Fri => "วันศุกร์",
        Weekday::Sat => "วันเสาร์",
        Weekday::Sun => "วันอาทิตย์",
    }
}

/// Abbreviated weekday name, e.g. `จ.`.
pub fn weekday_name_short(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "จ.",
        Weekday::Tue => "อ.",
        Weekday::Wed => "พ.",
        Weekday::Thu => "พฤ.",
        Weekday::Fri => "ศ.",
        Weekday::Sat => "ส.",
        Weekday::Sun => "อา.",
    }
}

/// Long date, e.g. `วันพุธที่ 1 มกราคม 2568`.
pub fn format_date_long(date: NaiveDate) -> String {
    format!(
        "{weekday}ที่ {day} {month} {year}",
        weekday = weekday_name(date.weekday()),
        day = date.day(),
        month = MONTHS[date.month0() as usize],
        year = buddhist_year(date.year()),
    )
}

/// Table date, e.g. `พ. 1 ม.ค. 2568`.
pub fn format_date_short(date: NaiveDate) -> String {
    format!(
        "{weekday} {day} {month} {year}",
        weekday = weekday_name_short(date.weekday()),
        day = date.day(),
        month = MONTHS_SHORT[date.month0() as usize],
        year = buddhist_year(date.year()),
    )
}

/// Chart axis month, e.g. `ม.ค. 2568`.
pub fn format_month_short(year: i32, month0: u32) -> String {
    let name = month_name_short(month0).unwrap_or("?");
    format!("{name} {year}", year = buddhist_year(year))
}

/// Presentation attributes of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    /// Label used in tables, badges and exports.
    pub label: &'static str,
    /// Title used on summary cards.
    pub card_title: &'static str,
    /// Theme color token consumed by the presentation layer.
    pub color_token: &'static str,
}

const PRESENT: StatusStyle = StatusStyle {
    label: "เข้างาน",
    card_title: "เข้างาน",
    color_token: "green",
};

const LEAVE: StatusStyle = StatusStyle {
    label: "ลา",
    card_title: "ลาป่วย/ลากิจ",
    color_token: "red",
};

const NOT_REPORTED: StatusStyle = StatusStyle {
    label: "ไม่ระบุงาน",
    card_title: "ไม่รายงาน",
    color_token: "yellow",
};

/// Single lookup table from status to presentation attributes.
pub fn status_style(status: Status) -> StatusStyle {
    match status {
        Status::Present => PRESENT,
        Status::Leave => LEAVE,
        Status::NotReported => NOT_REPORTED,
    }
}

/// Localized label of a status.
pub fn status_label(status: Status) -> &'static str {
    status_style(status).label
}

/// Reverse lookup of [`status_label`].
pub fn status_from_label(label: &str) -> Option<Status> {
    Status::ALL.into_iter().find(|s| status_label(*s) == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buddhist_year_conversion() {
        assert_eq!(buddhist_year(2025), 2568);
        assert_eq!(gregorian_year(2568), 2025);
    }

    #[test]
    fn test_month_names_bounds() {
        assert_eq!(month_name(0), Some("มกราคม"));
        assert_eq!(month_name(11), Some("ธันวาคม"));
        assert_eq!(month_name(12), None);
        assert_eq!(month_name_short(1), Some("ก.พ."));
    }

    #[test]
    fn test_format_date_long() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(format_date_long(date), "วันพุธที่ 1 มกราคม 2568");
    }

    #[test]
    fn test_format_date_short() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(format_date_short(date), "ศ. 28 ก.พ. 2568");
    }

    #[test]
    fn test_status_labels_are_total_and_distinct() {
        let labels: Vec<_> = Status::ALL.into_iter().map(status_label).collect();
        assert_eq!(labels, ["เข้างาน", "ลา", "ไม่ระบุงาน"]);
        for status in Status::ALL {
            assert_eq!(status_from_label(status_label(status)), Some(status));
        }
    }
}
