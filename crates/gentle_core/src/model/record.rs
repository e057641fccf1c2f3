//! Shared record contract for namespace persistence and autosave.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage key holding the daily namespace blob.
pub const DAILY_STORAGE_KEY: &str = "gentle_self_daily";
/// Storage key holding the quarterly namespace blob.
pub const QUARTERLY_STORAGE_KEY: &str = "gentle_self_quarterly";

/// A record persisted as one value inside a namespace mapping.
///
/// # Invariants
/// - `record_key()` is stable for the record lifetime.
/// - Namespace mappings are keyed by `record_key()`.
pub trait JournalRecord: Clone + Serialize + DeserializeOwned {
    /// Fixed blob key of the namespace this record lives in.
    const STORAGE_KEY: &'static str;

    /// Short namespace label used in log events.
    const NAMESPACE: &'static str;

    /// Key of this record inside its namespace mapping.
    fn record_key(&self) -> String;

    /// Hook invoked right before a commit is written.
    fn stamp_commit(&mut self, _at: DateTime<Utc>) {}
}
