//! Seven-day frequency rollup.
//!
//! # Responsibility
//! - Count habit flags and mood categories over the trailing week.
//!
//! # Invariants
//! - The window is the reference date and the six calendar days before it.
//! - Days without a stored entry contribute to no count.
//! - Each habit count and `days_recorded` lie in `0..=7`; mood counts sum
//!   to at most `days_recorded`.

use crate::model::daily_entry::{DailyEntry, Mood};
use crate::model::ids::DateId;
use crate::repo::blob_store::BlobStore;
use crate::repo::journal_store::{JournalStore, Namespace};

/// Number of days covered by the rollup.
pub const WEEK_LEN: u32 = 7;

/// Days in the window on which each habit was marked done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HabitCounts {
    pub future_step: u32,
    pub body_presence: u32,
    pub life_moment: u32,
}

/// Days in the window recorded with each mood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodCounts {
    pub calm: u32,
    pub ordinary: u32,
    pub tired: u32,
    pub low: u32,
}

impl MoodCounts {
    pub fn get(&self, mood: Mood) -> u32 {
        match mood {
            Mood::Calm => self.calm,
            Mood::Ordinary => self.ordinary,
            Mood::Tired => self.tired,
            Mood::Low => self.low,
        }
    }

    pub fn total(&self) -> u32 {
        self.calm + self.ordinary + self.tired + self.low
    }

    fn bump(&mut self, mood: Mood) {
        let slot = match mood {
            Mood::Calm => &mut self.calm,
            Mood::Ordinary => &mut self.ordinary,
            Mood::Tired => &mut self.tired,
            Mood::Low => &mut self.low,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyStats {
    /// Candidate days, oldest first, ending at the reference date.
    pub window: Vec<DateId>,
    pub habit_counts: HabitCounts,
    pub mood_counts: MoodCounts,
    pub days_recorded: u32,
}

/// Aggregates `entries` over the week ending at `reference_date`.
pub fn weekly_stats(entries: &Namespace<DailyEntry>, reference_date: DateId) -> WeeklyStats {
    let window = reference_date.trailing_window(WEEK_LEN);
    let mut habit_counts = HabitCounts::default();
    let mut mood_counts = MoodCounts::default();
    let mut days_recorded = 0;

    for entry in window.iter().filter_map(|day| entries.get(&day.to_string())) {
        days_recorded += 1;
        habit_counts.future_step += u32::from(entry.future_step);
        habit_counts.body_presence += u32::from(entry.body_presence);
        habit_counts.life_moment += u32::from(entry.life_moment);
        if let Some(mood) = entry.mood {
            mood_counts.bump(mood);
        }
    }

    WeeklyStats {
        window,
        habit_counts,
        mood_counts,
        days_recorded,
    }
}

/// Loads the daily namespace and aggregates the week ending at `reference_date`.
pub fn weekly_stats_from_store<S: BlobStore>(
    store: &JournalStore<S>,
    reference_date: DateId,
) -> WeeklyStats {
    weekly_stats(&store.daily_entries(), reference_date)
}
