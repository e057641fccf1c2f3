//! View-state holder for one day's entry.
//!
//! # Responsibility
//! - Load the entry for a day (or a defaulted one) into an editable draft.
//! - Route every field edit through the debounced autosave controller.
//!
//! # Invariants
//! - The draft's `date` never changes after `open`.
//! - Opening a day never writes; only edits lead to commits.

use crate::config::AutosaveConfig;
use crate::model::daily_entry::{DailyEntry, Mood};
use crate::model::ids::{today_id, DateId};
use crate::repo::blob_store::BlobStore;
use crate::repo::journal_store::JournalStore;
use crate::service::autosave::{AutosaveController, CommitOutcome, SaveStatus};
use log::debug;
use std::time::Instant;

/// Editable draft of a single day plus its autosave state.
#[derive(Debug, Clone)]
pub struct DailyJournal {
    draft: DailyEntry,
    autosave: AutosaveController<DailyEntry>,
}

impl DailyJournal {
    /// Loads the stored entry for `date`, defaulting when absent.
    pub fn open<S: BlobStore>(
        store: &JournalStore<S>,
        date: DateId,
        config: &AutosaveConfig,
    ) -> Self {
        let key = date.to_string();
        let stored = store.daily_entries().remove(&key);
        debug!(
            "event=daily_open module=service status=ok date={} stored={}",
            key,
            stored.is_some()
        );
        Self {
            draft: stored.unwrap_or_else(|| DailyEntry::new(date)),
            autosave: AutosaveController::new(config.daily_delay),
        }
    }

    /// Opens the holder for the local calendar day.
    pub fn open_today<S: BlobStore>(store: &JournalStore<S>, config: &AutosaveConfig) -> Self {
        Self::open(store, today_id(), config)
    }

    pub fn date(&self) -> DateId {
        self.draft.date
    }

    pub fn draft(&self) -> &DailyEntry {
        &self.draft
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn autosave(&self) -> &AutosaveController<DailyEntry> {
        &self.autosave
    }

    /// Whether the holder was opened for a day other than `today`.
    pub fn is_stale(&self, today: DateId) -> bool {
        self.draft.date != today
    }

    pub fn set_future_step(&mut self, done: bool, now: Instant) {
        self.edit(now, |entry| entry.future_step = done);
    }

    pub fn toggle_future_step(&mut self, now: Instant) {
        self.edit(now, |entry| entry.future_step = !entry.future_step);
    }

    pub fn set_body_presence(&mut self, done: bool, now: Instant) {
        self.edit(now, |entry| entry.body_presence = done);
    }

    pub fn toggle_body_presence(&mut self, now: Instant) {
        self.edit(now, |entry| entry.body_presence = !entry.body_presence);
    }

    pub fn set_life_moment(&mut self, done: bool, now: Instant) {
        self.edit(now, |entry| entry.life_moment = done);
    }

    pub fn toggle_life_moment(&mut self, now: Instant) {
        self.edit(now, |entry| entry.life_moment = !entry.life_moment);
    }

    /// Sets or clears the mood.
    pub fn set_mood(&mut self, mood: Option<Mood>, now: Instant) {
        self.edit(now, |entry| entry.mood = mood);
    }

    pub fn set_mental_noise(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.edit(now, |entry| entry.mental_noise = text);
    }

    pub fn set_note(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.edit(now, |entry| entry.note = text);
    }

    /// Commits the draft if the idle delay has elapsed.
    pub fn poll<S: BlobStore>(
        &mut self,
        now: Instant,
        store: &JournalStore<S>,
    ) -> Option<CommitOutcome<DailyEntry>> {
        self.autosave.poll(now, store)
    }

    /// Commits any uncommitted edit right away.
    pub fn flush<S: BlobStore>(
        &mut self,
        store: &JournalStore<S>,
    ) -> Option<CommitOutcome<DailyEntry>> {
        self.autosave.flush(store)
    }

    fn edit(&mut self, now: Instant, apply: impl FnOnce(&mut DailyEntry)) {
        apply(&mut self.draft);
        self.autosave.on_edit(self.draft.clone(), now);
    }
}
