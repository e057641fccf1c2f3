//! Canonical day and quarter identifiers.
//!
//! # Responsibility
//! - Derive `today` and `current quarter` identifiers from local wall-clock time.
//! - Render and parse the persisted key formats (`YYYY-MM-DD`, `YYYY-QN`).
//!
//! # Invariants
//! - `DateId` always renders zero-padded as `YYYY-MM-DD`.
//! - Quarter number is `floor((month0 + 3) / 3)` over a 0-indexed month,
//!   so January..March is `Q1` and October..December is `Q4`.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error returned when a stored or host-supplied key is not canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    Date(String),
    Quarter(String),
}

impl Display for IdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(value) => write!(f, "invalid date id `{value}`; expected YYYY-MM-DD"),
            Self::Quarter(value) => write!(f, "invalid quarter id `{value}`; expected YYYY-QN"),
        }
    }
}

impl Error for IdParseError {}

/// Calendar day in local time, keyed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateId(NaiveDate);

impl DateId {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds an id from calendar parts; `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the `len` consecutive days ending at and including `self`,
    /// oldest first.
    pub fn trailing_window(&self, len: u32) -> Vec<DateId> {
        (0..len)
            .rev()
            .filter_map(|offset| self.0.checked_sub_days(Days::new(u64::from(offset))))
            .map(Self)
            .collect()
    }

    /// Quarter this day belongs to.
    pub fn quarter(&self) -> QuarterId {
        QuarterId::from_date(self.0)
    }
}

impl Display for DateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateId {
    type Err = IdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        // chrono accepts unpadded parts; the key format does not.
        if trimmed.len() != 10 {
            return Err(IdParseError::Date(value.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(Self)
            .map_err(|_| IdParseError::Date(value.to_string()))
    }
}

impl Serialize for DateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Three-month period keyed as `YYYY-QN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterId {
    year: i32,
    quarter: u8,
}

impl QuarterId {
    /// Builds an id; `None` unless `quarter` is in `1..=4`.
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        let quarter = ((date.month0() + 3) / 3) as u8;
        Self {
            year: date.year(),
            quarter,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }
}

impl Display for QuarterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

impl FromStr for QuarterId {
    type Err = IdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || IdParseError::Quarter(value.to_string());
        let (year, quarter) = value.trim().split_once("-Q").ok_or_else(invalid)?;
        if year.len() != 4 || quarter.len() != 1 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let quarter = quarter.parse::<u8>().map_err(|_| invalid())?;
        Self::new(year, quarter).ok_or_else(invalid)
    }
}

impl Serialize for QuarterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuarterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Local calendar date at call time.
///
/// Not stable across calls that straddle local midnight.
pub fn today_id() -> DateId {
    DateId(Local::now().date_naive())
}

/// Quarter of the local calendar date at call time.
pub fn current_quarter_id() -> QuarterId {
    QuarterId::from_date(Local::now().date_naive())
}
