//! Date keys and the injected wall clock.
//!
//! A [`DateKey`] is the canonical `YYYY-MM-DD` form of a local calendar date.
//! It is the only identifier used for completion days, and its string order is
//! its chronological order.
//!
//! The logical "today" is shifted by a rollover hour: with a rollover of 4, any
//! time before 04:00 still belongs to the previous date.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Default hour at which a new logical day begins.
pub const DEFAULT_ROLLOVER_HOUR: u32 = 4;

/// Highest accepted rollover hour.
pub const MAX_ROLLOVER_HOUR: u32 = 23;

/// Canonical `YYYY-MM-DD` date key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date key '{0}': expected YYYY-MM-DD")]
pub struct ParseDateKeyError(String);

impl DateKey {
    /// Key of a calendar date (`dateKey`).
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Calendar date of this key (`parseKeyToDate`).
    pub fn to_date(self) -> NaiveDate {
        self.0
    }

    /// Key of the calendar day immediately before this one.
    pub fn prev_day(self) -> Self {
        Self(self.0.pred_opt().unwrap_or(NaiveDate::MIN))
    }

    /// Key of the calendar day immediately after this one.
    pub fn next_day(self) -> Self {
        Self(self.0.succ_opt().unwrap_or(NaiveDate::MAX))
    }

    /// Key of the Monday starting this key's ISO week.
    pub fn week_start(self) -> Self {
        Self(start_of_week(self.0))
    }

    pub fn weekday(self) -> chrono::Weekday {
        self.0.weekday()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = ParseDateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDateKeyError(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(invalid());
        }
        let digits = |range: std::ops::Range<usize>| -> Result<u32, ParseDateKeyError> {
            if !bytes[range.clone()].iter().all(u8::is_ascii_digit) {
                return Err(invalid());
            }
            s[range].parse::<u32>().map_err(|_| invalid())
        };
        let year = digits(0..4)?;
        let month = digits(5..7)?;
        let day = digits(8..10)?;
        NaiveDate::from_ymd_opt(year as i32, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Monday of the ISO week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Clamp an arbitrary hour value into the accepted rollover range.
pub fn clamp_rollover_hour(hour: i64) -> u32 {
    hour.clamp(0, i64::from(MAX_ROLLOVER_HOUR)) as u32
}

/// The single source of "now" for every date computation.
pub trait Clock {
    /// Local wall-clock time.
    fn now_local(&self) -> NaiveDateTime;

    /// Absolute time, used for creation timestamps.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Today's key, shifted back by `rollover_hour` hours.
    fn today_key(&self, rollover_hour: u32) -> DateKey {
        let adjusted = self.now_local() - Duration::hours(i64::from(rollover_hour));
        DateKey::from_date(adjusted.date())
    }
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock. Local and UTC time are the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Clock at `hour:00` on the given date.
    ///
    /// Out-of-range components fall back to the Unix epoch.
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap_or_default();
        Self::new(now)
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now_local(&self) -> NaiveDateTime {
        self.now.get()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now.get().and_utc()
    }
}
