//! Debounced autosave for one in-memory record.
//!
//! # Responsibility
//! - Coalesce bursts of edits into one namespace upsert after an idle delay.
//! - Track the saved/unsaved status shown next to the editor.
//!
//! # Invariants
//! - At most one timer is armed per controller; every edit re-arms it.
//! - `on_edit` flips status to `Unsaved` before the timer is armed.
//! - A commit always writes the latest edited value (last write wins).
//! - Status becomes `Saved` only after the storage write succeeded.
//!
//! Time is passed in explicitly; the host drives `poll` from its event loop.

use crate::model::record::JournalRecord;
use crate::repo::blob_store::{BlobStore, RepoError};
use crate::repo::journal_store::{JournalStore, Namespace};
use chrono::Utc;
use log::{info, warn};
use std::time::{Duration, Instant};

/// Saved/unsaved indicator for the record being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Storage holds the latest edit (or nothing was edited yet).
    Saved,
    /// An edit is waiting for the idle delay to elapse.
    Unsaved,
    /// The last commit attempt failed; the edit is still held in memory.
    Failed,
}

impl SaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Unsaved => "unsaved",
            Self::Failed => "failed",
        }
    }
}

/// Single-shot, cancellable deadline.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms the timer at `now + delay`, replacing any earlier deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// Result of one commit attempt.
#[derive(Debug)]
pub enum CommitOutcome<R> {
    /// The record was written; `namespace` is the mapping after the upsert.
    Committed { record: R, namespace: Namespace<R> },
    Failed(RepoError),
}

#[derive(Debug, Clone)]
enum AutosaveState<R> {
    Idle,
    Pending(R),
    Committed,
    Failed(R),
}

/// Debounced commit state machine: `Idle -> Pending -> Committed`, with any
/// edit returning to `Pending` and a failed write parking in `Failed`.
#[derive(Debug, Clone)]
pub struct AutosaveController<R: JournalRecord> {
    timer: DebounceTimer,
    state: AutosaveState<R>,
    status: SaveStatus,
    commits: u64,
}

impl<R: JournalRecord> AutosaveController<R> {
    pub fn new(delay: Duration) -> Self {
        Self {
            timer: DebounceTimer::new(delay),
            state: AutosaveState::Idle,
            status: SaveStatus::Saved,
            commits: 0,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    /// Number of successful commits performed by this controller.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Value waiting to be written, if any.
    pub fn pending_value(&self) -> Option<&R> {
        match &self.state {
            AutosaveState::Pending(value) | AutosaveState::Failed(value) => Some(value),
            AutosaveState::Idle | AutosaveState::Committed => None,
        }
    }

    pub fn has_uncommitted(&self) -> bool {
        self.pending_value().is_some()
    }

    /// Records a new edit and restarts the idle delay.
    pub fn on_edit(&mut self, value: R, now: Instant) {
        self.status = SaveStatus::Unsaved;
        self.state = AutosaveState::Pending(value);
        self.timer.arm(now);
    }

    /// Commits the pending value when the idle delay has elapsed at `now`.
    pub fn poll<S: BlobStore>(
        &mut self,
        now: Instant,
        store: &JournalStore<S>,
    ) -> Option<CommitOutcome<R>> {
        if !self.timer.is_due(now) {
            return None;
        }
        self.commit(store)
    }

    /// Commits any pending or previously failed value immediately.
    pub fn flush<S: BlobStore>(&mut self, store: &JournalStore<S>) -> Option<CommitOutcome<R>> {
        self.commit(store)
    }

    /// Drops any uncommitted value without writing it.
    pub fn discard(&mut self) {
        self.timer.cancel();
        self.state = AutosaveState::Idle;
        self.status = SaveStatus::Saved;
    }

    fn commit<S: BlobStore>(&mut self, store: &JournalStore<S>) -> Option<CommitOutcome<R>> {
        self.timer.cancel();
        let mut record = match std::mem::replace(&mut self.state, AutosaveState::Idle) {
            AutosaveState::Pending(value) | AutosaveState::Failed(value) => value,
            other => {
                self.state = other;
                return None;
            }
        };

        record.stamp_commit(Utc::now());
        match store.upsert(&record) {
            Ok(namespace) => {
                self.commits += 1;
                self.state = AutosaveState::Committed;
                self.status = SaveStatus::Saved;
                info!(
                    "event=autosave_commit module=service status=ok namespace={} key={}",
                    R::NAMESPACE,
                    record.record_key()
                );
                Some(CommitOutcome::Committed { record, namespace })
            }
            Err(err) => {
                warn!(
                    "event=autosave_commit module=service status=error namespace={} key={} error={}",
                    R::NAMESPACE,
                    record.record_key(),
                    err
                );
                self.state = AutosaveState::Failed(record);
                self.status = SaveStatus::Failed;
                Some(CommitOutcome::Failed(err))
            }
        }
    }
}
