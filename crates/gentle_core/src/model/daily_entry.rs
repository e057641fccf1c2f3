//! Daily entry record.
//!
//! # Responsibility
//! - Hold one day's habit flags, mood and free-text notes.
//!
//! # Invariants
//! - `date` is the namespace key and never changes after creation.
//! - Serialized shape is `{date, future_step, body_presence, life_moment,
//!   mood, mental_noise, note}` with `mood: null` when absent.

use crate::model::ids::DateId;
use crate::model::record::{JournalRecord, DAILY_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Self-reported mood category for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Calm,
    Ordinary,
    Tired,
    Low,
}

impl Mood {
    /// All categories in display order.
    pub const ALL: [Mood; 4] = [Mood::Calm, Mood::Ordinary, Mood::Tired, Mood::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Ordinary => "ordinary",
            Self::Tired => "tired",
            Self::Low => "low",
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == value.trim())
            .ok_or_else(|| format!("unknown mood `{value}`; expected calm|ordinary|tired|low"))
    }
}

/// One calendar day of journaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: DateId,
    /// Did one small thing that helps the future.
    #[serde(default)]
    pub future_step: bool,
    /// Did one thing that brought the body back to the present.
    #[serde(default)]
    pub body_presence: bool,
    /// Noticed one moment of everyday life.
    #[serde(default)]
    pub life_moment: bool,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub mental_noise: String,
    /// Intended as a single short line; length is not enforced.
    #[serde(default)]
    pub note: String,
}

impl DailyEntry {
    /// Creates the defaulted record for `date`.
    pub fn new(date: DateId) -> Self {
        Self {
            date,
            future_step: false,
            body_presence: false,
            life_moment: false,
            mood: None,
            mental_noise: String::new(),
            note: String::new(),
        }
    }
}

impl JournalRecord for DailyEntry {
    const STORAGE_KEY: &'static str = DAILY_STORAGE_KEY;
    const NAMESPACE: &'static str = "daily";

    fn record_key(&self) -> String {
        self.date.to_string()
    }
}
