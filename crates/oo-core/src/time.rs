//! Clock and regional time helpers
//!
//! Timestamps are stored in UTC. Day bucketing, file naming and display use a
//! fixed regional offset (UTC+7 unless configured otherwise).

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use std::sync::Mutex;

use crate::error::OoError;
use crate::result::OoResult;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Fixed-offset regional timezone
#[derive(Debug, Clone, Copy)]
pub struct RegionalTime {
    offset: FixedOffset,
}

impl Default for RegionalTime {
    fn default() -> Self {
        Self {
            // UTC+7
            offset: FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl RegionalTime {
    pub fn new(offset_hours: i32) -> OoResult<Self> {
        offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| OoError::Config(format!("invalid timezone offset: {}h", offset_hours)))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The instant expressed in regional time
    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset)
    }

    /// Regional calendar day of an instant
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.local(at).date_naive()
    }

    /// UTC bounds `[start, end)` of a regional calendar day
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of(date);
        (start, start + Duration::days(1))
    }

    /// UTC bounds `[start, end)` of a regional calendar month
    pub fn month_bounds(&self, year: i32, month: u32) -> OoResult<(DateTime<Utc>, DateTime<Utc>)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| OoError::invalid("month", "is not a valid month"))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| OoError::invalid("month", "is out of range"))?;
        Ok((self.start_of(first), self.start_of(next)))
    }

    /// Regional (year, month) of an instant
    pub fn year_month(&self, at: DateTime<Utc>) -> (i32, u32) {
        let local = self.local(at);
        (local.year(), local.month())
    }

    fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        let utc = midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_date_crosses_midnight() {
        let tz = RegionalTime::default();
        // 18:30 UTC is 01:30 the next day at UTC+7
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 18, 30, 0).unwrap();
        assert_eq!(tz.local_date(at), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn test_day_bounds() {
        let tz = RegionalTime::default();
        let (start, end) = tz.day_bounds(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 15, 17, 0, 0).unwrap());
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn test_month_bounds_december() {
        let tz = RegionalTime::new(0).unwrap();
        let (start, end) = tz.month_bounds(2026, 12).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
        assert!(tz.month_bounds(2026, 13).is_err());
    }

    #[test]
    fn test_invalid_offset() {
        assert!(RegionalTime::new(30).is_err());
        assert!(RegionalTime::new(-24).is_err());
        assert!(matches!(RegionalTime::new(i32::MAX), Err(OoError::Config(_))));
        assert!(matches!(RegionalTime::new(i32::MIN), Err(OoError::Config(_))));
        assert_eq!(RegionalTime::new(-5).unwrap().offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_fixed_clock_advance() {
        let start = Utc.with_ymd_and_hms(2026, 10, 16, 1, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), start + Duration::minutes(90));
    }
}
