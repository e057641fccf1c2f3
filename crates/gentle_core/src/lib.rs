//! Core domain logic for the Gentle Self journal.
//! This crate is the single source of truth for journaling invariants:
//! identifiers, persisted record shapes, debounced autosave and the weekly
//! rollup. Rendering and navigation live in the host shell.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::AutosaveConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::daily_entry::{DailyEntry, Mood};
pub use model::ids::{current_quarter_id, today_id, DateId, IdParseError, QuarterId};
pub use model::quarterly_review::{QuarterlyField, QuarterlyReview};
pub use model::record::{JournalRecord, DAILY_STORAGE_KEY, QUARTERLY_STORAGE_KEY};
pub use repo::blob_store::{BlobStore, RepoError, RepoResult, SqliteBlobStore};
pub use repo::journal_store::{JournalStore, Namespace};
pub use service::autosave::{AutosaveController, CommitOutcome, DebounceTimer, SaveStatus};
pub use service::daily_journal::DailyJournal;
pub use service::quarterly_journal::QuarterlyJournal;
pub use service::weekly_stats::{
    weekly_stats, weekly_stats_from_store, HabitCounts, MoodCounts, WeeklyStats,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
