//! View-state holder for quarterly reviews.
//!
//! # Responsibility
//! - Keep the selected quarter's review as an editable draft.
//! - List the quarters that can be viewed (stored ones plus the current one).
//! - Switch the viewed quarter without losing pending edits.
//!
//! # Invariants
//! - `quarter_options()` is sorted newest first and always contains the
//!   current quarter, stored or not.
//! - An unedited review is never written.
//! - The review cache is replaced by the mapping returned from each commit.
//! - Past quarters are editable at this layer; read-only display is up to
//!   the presentation layer.

use crate::config::AutosaveConfig;
use crate::model::ids::{current_quarter_id, QuarterId};
use crate::model::quarterly_review::{QuarterlyField, QuarterlyReview};
use crate::repo::blob_store::BlobStore;
use crate::repo::journal_store::{JournalStore, Namespace};
use crate::service::autosave::{AutosaveController, CommitOutcome, SaveStatus};
use log::{debug, warn};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct QuarterlyJournal {
    current: QuarterId,
    draft: QuarterlyReview,
    reviews: Namespace<QuarterlyReview>,
    autosave: AutosaveController<QuarterlyReview>,
}

impl QuarterlyJournal {
    /// Loads all stored reviews and selects `current`.
    pub fn open<S: BlobStore>(
        store: &JournalStore<S>,
        current: QuarterId,
        config: &AutosaveConfig,
    ) -> Self {
        let reviews = store.quarterly_reviews();
        debug!(
            "event=quarterly_open module=service status=ok current={} stored={}",
            current,
            reviews.len()
        );
        let draft = lookup(&reviews, current);
        Self {
            current,
            draft,
            reviews,
            autosave: AutosaveController::new(config.quarterly_delay),
        }
    }

    /// Opens the holder on the quarter of the local calendar date.
    pub fn open_current<S: BlobStore>(store: &JournalStore<S>, config: &AutosaveConfig) -> Self {
        Self::open(store, current_quarter_id(), config)
    }

    pub fn current(&self) -> QuarterId {
        self.current
    }

    pub fn selected(&self) -> QuarterId {
        self.draft.id
    }

    pub fn is_viewing_current(&self) -> bool {
        self.draft.id == self.current
    }

    pub fn draft(&self) -> &QuarterlyReview {
        &self.draft
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn autosave(&self) -> &AutosaveController<QuarterlyReview> {
        &self.autosave
    }

    /// Cached reviews as of the last load or commit.
    pub fn reviews(&self) -> &Namespace<QuarterlyReview> {
        &self.reviews
    }

    /// Viewable quarters, newest first.
    pub fn quarter_options(&self) -> Vec<QuarterId> {
        let mut options = self
            .reviews
            .values()
            .map(|review| review.id)
            .chain(std::iter::once(self.current))
            .collect::<Vec<_>>();
        options.sort_unstable_by(|a, b| b.cmp(a));
        options.dedup();
        options
    }

    /// Replaces one text field of the draft and schedules a commit.
    pub fn set_field(&mut self, field: QuarterlyField, text: impl Into<String>, now: Instant) {
        self.draft.set_field(field, text);
        self.autosave.on_edit(self.draft.clone(), now);
    }

    /// Switches the viewed quarter.
    ///
    /// Pending edits of the previous quarter are committed first. When that
    /// commit fails the selection is kept so the edit is not hidden.
    pub fn select<S: BlobStore>(
        &mut self,
        quarter: QuarterId,
        store: &JournalStore<S>,
    ) -> Option<CommitOutcome<QuarterlyReview>> {
        let outcome = self.flush(store);
        if matches!(outcome, Some(CommitOutcome::Failed(_))) {
            warn!(
                "event=quarterly_select module=service status=blocked from={} to={} reason=flush_failed",
                self.draft.id, quarter
            );
            return outcome;
        }

        self.draft = lookup(&self.reviews, quarter);
        debug!(
            "event=quarterly_select module=service status=ok quarter={} stored={}",
            quarter,
            self.draft.updated_at.is_some()
        );
        outcome
    }

    /// Commits the draft if the idle delay has elapsed.
    pub fn poll<S: BlobStore>(
        &mut self,
        now: Instant,
        store: &JournalStore<S>,
    ) -> Option<CommitOutcome<QuarterlyReview>> {
        let outcome = self.autosave.poll(now, store);
        self.absorb(&outcome);
        outcome
    }

    /// Commits any uncommitted edit right away.
    pub fn flush<S: BlobStore>(
        &mut self,
        store: &JournalStore<S>,
    ) -> Option<CommitOutcome<QuarterlyReview>> {
        let outcome = self.autosave.flush(store);
        self.absorb(&outcome);
        outcome
    }

    fn absorb(&mut self, outcome: &Option<CommitOutcome<QuarterlyReview>>) {
        if let Some(CommitOutcome::Committed { record, namespace }) = outcome {
            self.reviews = namespace.clone();
            if record.id == self.draft.id {
                self.draft.updated_at = record.updated_at;
            }
        }
    }
}

fn lookup(reviews: &Namespace<QuarterlyReview>, quarter: QuarterId) -> QuarterlyReview {
    reviews
        .get(&quarter.to_string())
        .cloned()
        .unwrap_or_else(|| QuarterlyReview::new(quarter))
}

#[cfg(test)]
mod tests {
    use super::QuarterlyJournal;
    use crate::config::AutosaveConfig;
    use crate::db::open_db_in_memory;
    use crate::model::ids::QuarterId;
    use crate::model::quarterly_review::{QuarterlyField, QuarterlyReview};
    use crate::repo::blob_store::SqliteBlobStore;
    use crate::repo::journal_store::JournalStore;
    use crate::service::autosave::SaveStatus;
    use std::time::{Duration, Instant};

    fn store() -> JournalStore<SqliteBlobStore> {
        JournalStore::new(SqliteBlobStore::new(open_db_in_memory().unwrap()))
    }

    fn quarter(raw: &str) -> QuarterId {
        raw.parse().unwrap()
    }

    #[test]
    fn options_include_unsaved_current_quarter_sorted_descending() {
        let store = store();
        for id in ["2023-Q4", "2024-Q1", "2022-Q2"] {
            let mut review = QuarterlyReview::new(quarter(id));
            review.intention = "x".to_string();
            store.upsert_quarterly_review(&review).unwrap();
        }

        let journal = QuarterlyJournal::open(&store, quarter("2024-Q2"), &AutosaveConfig::default());
        let options = journal
            .quarter_options()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(options, vec!["2024-Q2", "2024-Q1", "2023-Q4", "2022-Q2"]);
    }

    #[test]
    fn stored_current_quarter_is_listed_once() {
        let store = store();
        store
            .upsert_quarterly_review(&QuarterlyReview::new(quarter("2024-Q2")))
            .unwrap();
        let journal = QuarterlyJournal::open(&store, quarter("2024-Q2"), &AutosaveConfig::default());
        assert_eq!(journal.quarter_options(), vec![quarter("2024-Q2")]);
    }

    #[test]
    fn unedited_quarter_is_never_written() {
        let store = store();
        let mut journal =
            QuarterlyJournal::open(&store, quarter("2024-Q2"), &AutosaveConfig::default());
        assert!(journal
            .poll(Instant::now() + Duration::from_secs(60), &store)
            .is_none());
        assert!(journal.flush(&store).is_none());
        assert!(store.quarterly_reviews().is_empty());
    }

    #[test]
    fn commit_stamps_timestamp_and_refreshes_cache() {
        let store = store();
        let config = AutosaveConfig::default();
        let mut journal = QuarterlyJournal::open(&store, quarter("2024-Q2"), &config);
        let start = Instant::now();

        journal.set_field(QuarterlyField::Intention, "rest", start);
        assert_eq!(journal.save_status(), SaveStatus::Unsaved);
        assert!(journal.poll(start + config.daily_delay, &store).is_none());
        assert!(journal.poll(start + config.quarterly_delay, &store).is_some());

        assert_eq!(journal.save_status(), SaveStatus::Saved);
        assert!(journal.draft().updated_at.is_some());
        assert!(journal.reviews().contains_key("2024-Q2"));
        assert_eq!(store.quarterly_reviews()["2024-Q2"].intention, "rest");
    }

    #[test]
    fn selecting_flushes_pending_edit_and_loads_target() {
        let store = store();
        let mut past = QuarterlyReview::new(quarter("2024-Q1"));
        past.proof_of_progress = "finished the book".to_string();
        store.upsert_quarterly_review(&past).unwrap();

        let mut journal =
            QuarterlyJournal::open(&store, quarter("2024-Q2"), &AutosaveConfig::default());
        journal.set_field(QuarterlyField::Intention, "slow mornings", Instant::now());

        assert!(journal.select(quarter("2024-Q1"), &store).is_some());
        assert!(!journal.is_viewing_current());
        assert_eq!(journal.draft().proof_of_progress, "finished the book");
        assert_eq!(store.quarterly_reviews()["2024-Q2"].intention, "slow mornings");

        assert!(journal.select(quarter("2024-Q2"), &store).is_none());
        assert_eq!(journal.draft().intention, "slow mornings");
    }
}
