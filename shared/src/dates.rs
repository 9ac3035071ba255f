//! Date helpers for `YYYY-MM-DD` dates and `YYYY-MM` month keys.

use chrono::{Datelike, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `YYYY-MM` key of the month containing `date`
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parse a `YYYY-MM` month key into (year, month)
pub fn parse_month(month: &str) -> Option<(i32, u32)> {
    let (year, month_num) = month.split_once('-')?;
    if year.len() != 4 || month_num.len() != 2 {
        return None;
    }
    let year = year.parse::<i32>().ok()?;
    let month_num = month_num.parse::<u32>().ok()?;
    if (1..=12).contains(&month_num) {
        Some((year, month_num))
    } else {
        None
    }
}

/// First day of the month and first day of the following month, as
/// `YYYY-MM-DD` strings suitable for a `date >= start AND date < end` filter
pub fn month_bounds(month: &str) -> Option<(String, String)> {
    let (year, month_num) = parse_month(month)?;
    let start = NaiveDate::from_ymd_opt(year, month_num, 1)?;
    let (next_year, next_month) = next_month(year, month_num);
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((format_date(start), format_date(end)))
}

/// Whether a `YYYY-MM-DD` date falls within a `YYYY-MM` month
pub fn date_in_month(date_str: &str, month: &str) -> bool {
    match parse_date(date_str) {
        Some(date) => month_key(date) == month,
        None => false,
    }
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("January")
}

/// Get days in a month (accounting for leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) { 29 } else { 28 }
        }
        _ => 30,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Step `offset` months back from (year, month)
pub fn months_back(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) - offset as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Days from `today` until the next salary payment.
///
/// When the salary day is today or already passed this month the next
/// payment is next month. Days beyond the end of a short month are
/// clamped to its last day.
pub fn days_until_salary(today: NaiveDate, salary_day: u32) -> i64 {
    let (mut year, mut month) = (today.year(), today.month());
    if today.day() >= salary_day.clamp(1, days_in_month(year, month)) {
        (year, month) = next_month(year, month);
    }
    let day = salary_day.clamp(1, days_in_month(year, month));
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(next) => (next - today).num_days(),
        None => 0,
    }
}

/// Whole days from `today` until `target_date`; zero or negative means overdue
pub fn days_until(today: NaiveDate, target_date: &str) -> Option<i64> {
    parse_date(target_date).map(|target| (target - today).num_days())
}
