//! Current date source for the hooks.
//!
//! Hooks ask a [`Clock`] for "today" instead of reading the system time so
//! month boundaries and placeholder ids can be pinned in tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, SecondsFormat, Utc};
use shared::dates::{format_date, month_key};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// RFC 3339 timestamp for placeholder rows
    fn now_timestamp(&self) -> String;

    /// `YYYY-MM` of today
    fn current_month(&self) -> String {
        month_key(self.today())
    }

    fn today_string(&self) -> String {
        format_date(self.today())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now_timestamp(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// A clock frozen on one date. Each `now_millis` call advances by one
/// millisecond so placeholder ids stay distinct.
#[derive(Debug)]
pub struct FixedClock {
    today: NaiveDate,
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        let millis = today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default();
        Self {
            today,
            millis: AtomicI64::new(millis),
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> i64 {
        self.millis.fetch_add(1, Ordering::SeqCst)
    }

    fn now_timestamp(&self) -> String {
        format!("{}T12:00:00.000000Z", format_date(self.today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(clock.current_month(), "2025-06");
        assert_eq!(clock.today_string(), "2025-06-14");

        let first = clock.now_millis();
        assert_eq!(clock.now_millis(), first + 1);
    }
}
