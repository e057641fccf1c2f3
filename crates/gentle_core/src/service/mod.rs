//! Core use-case services.
//!
//! # Responsibility
//! - Debounced autosave of edited records.
//! - View-state holders for the daily and quarterly views.
//! - Read-only weekly aggregation.
//!
//! # Invariants
//! - Services reach storage only through `JournalStore`.

pub mod autosave;
pub mod daily_journal;
pub mod quarterly_journal;
pub mod weekly_stats;
