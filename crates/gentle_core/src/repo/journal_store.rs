//! Typed journal namespaces on top of a blob store.
//!
//! # Responsibility
//! - Expose read-all and upsert-one for the daily and quarterly namespaces.
//! - Import and export raw namespace blobs in the persisted JSON shape.
//!
//! # Invariants
//! - `load_all` never fails; missing, unreadable or corrupt blobs read as empty.
//! - A single record that does not decode is skipped on read and written back
//!   unchanged by `upsert`; it never costs the rest of the namespace.
//! - `upsert` replaces the record under its key wholesale and rewrites the
//!   whole namespace with one `write_blob` call.
//! - Mapping keys always equal `JournalRecord::record_key()` of their value
//!   for data written by this store.

use crate::model::daily_entry::DailyEntry;
use crate::model::quarterly_review::QuarterlyReview;
use crate::model::record::{JournalRecord, DAILY_STORAGE_KEY, QUARTERLY_STORAGE_KEY};
use crate::repo::blob_store::{BlobStore, RepoError, RepoResult};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Full contents of one namespace, keyed by record key.
pub type Namespace<R> = BTreeMap<String, R>;

/// Namespace contents before per-record decoding.
type RawNamespace = BTreeMap<String, Value>;

/// Journal persistence facade, constructed once and shared by holders.
pub struct JournalStore<S: BlobStore> {
    blobs: S,
}

impl<S: BlobStore> JournalStore<S> {
    pub fn new(blobs: S) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &S {
        &self.blobs
    }

    /// Reads the full namespace of `R`.
    ///
    /// Storage or parse failures are logged and reported as an empty mapping;
    /// records that fail to decode are logged and left out.
    pub fn load_all<R: JournalRecord>(&self) -> Namespace<R> {
        decode_records(self.load_raw::<R>())
    }

    /// Inserts or replaces `record` and returns the updated namespace.
    ///
    /// Records already stored under other keys are written back as they were
    /// read, including ones this build cannot decode.
    ///
    /// # Errors
    /// - Returns `RepoError` when serialization or the storage write fails.
    pub fn upsert<R: JournalRecord>(&self, record: &R) -> RepoResult<Namespace<R>> {
        let key = record.record_key();
        let mut raw = self.load_raw::<R>();
        raw.insert(key.clone(), serde_json::to_value(record)?);
        self.write_namespace::<R, _>(&raw)?;

        raw.remove(&key);
        let mut records: Namespace<R> = decode_records(raw);
        records.insert(key, record.clone());
        Ok(records)
    }

    pub fn daily_entries(&self) -> Namespace<DailyEntry> {
        self.load_all()
    }

    pub fn upsert_daily_entry(&self, entry: &DailyEntry) -> RepoResult<Namespace<DailyEntry>> {
        self.upsert(entry)
    }

    pub fn quarterly_reviews(&self) -> Namespace<QuarterlyReview> {
        self.load_all()
    }

    pub fn upsert_quarterly_review(
        &self,
        review: &QuarterlyReview,
    ) -> RepoResult<Namespace<QuarterlyReview>> {
        self.upsert(review)
    }

    /// Returns the raw JSON blob stored under `storage_key` (`{}` when empty).
    pub fn export_namespace(&self, storage_key: &str) -> RepoResult<String> {
        ensure_known_key(storage_key)?;
        Ok(self
            .blobs
            .read_blob(storage_key)?
            .unwrap_or_else(|| "{}".to_string()))
    }

    /// Replaces the namespace under `storage_key` with an imported blob.
    ///
    /// The blob must have exactly the persisted mapping shape; it is fully
    /// validated before anything is written. Returns the imported record count.
    pub fn import_namespace(&self, storage_key: &str, json: &str) -> RepoResult<usize> {
        match ensure_known_key(storage_key)? {
            DAILY_STORAGE_KEY => self.import_records::<DailyEntry>(json),
            _ => self.import_records::<QuarterlyReview>(json),
        }
    }

    fn import_records<R: JournalRecord>(&self, json: &str) -> RepoResult<usize> {
        let records: Namespace<R> = serde_json::from_str(json)
            .map_err(|err| RepoError::InvalidData(format!("{} blob: {err}", R::NAMESPACE)))?;

        if let Some((key, record)) = records
            .iter()
            .find(|(key, record)| **key != record.record_key())
        {
            return Err(RepoError::InvalidData(format!(
                "{} key `{key}` does not match record key `{}`",
                R::NAMESPACE,
                record.record_key()
            )));
        }

        self.write_namespace::<R, _>(&records)?;
        info!(
            "event=namespace_import module=repo status=ok namespace={} records={}",
            R::NAMESPACE,
            records.len()
        );
        Ok(records.len())
    }

    fn load_raw<R: JournalRecord>(&self) -> RawNamespace {
        let raw = match self.blobs.read_blob(R::STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RawNamespace::new(),
            Err(err) => {
                error!(
                    "event=namespace_load module=repo status=error namespace={} error_code=read_failed error={}",
                    R::NAMESPACE,
                    err
                );
                return RawNamespace::new();
            }
        };

        match serde_json::from_str::<RawNamespace>(&raw) {
            Ok(records) => records,
            Err(err) => {
                // serde_json errors carry position only, never blob content.
                warn!(
                    "event=namespace_load module=repo status=error namespace={} error_code=corrupt_blob error={}",
                    R::NAMESPACE,
                    err
                );
                RawNamespace::new()
            }
        }
    }

    fn write_namespace<R: JournalRecord, T: Serialize>(&self, records: &T) -> RepoResult<()> {
        let blob = serde_json::to_string(records)?;
        self.blobs.write_blob(R::STORAGE_KEY, &blob).map_err(|err| {
            error!(
                "event=namespace_write module=repo status=error namespace={} error_code=write_failed error={}",
                R::NAMESPACE,
                err
            );
            err
        })
    }
}

fn decode_records<R: JournalRecord>(raw: RawNamespace) -> Namespace<R> {
    raw.into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<R>(value) {
            Ok(record) => Some((key, record)),
            Err(err) => {
                warn!(
                    "event=namespace_load module=repo status=skipped namespace={} key={} error_code=bad_record error={}",
                    R::NAMESPACE,
                    key,
                    err
                );
                None
            }
        })
        .collect()
}

fn ensure_known_key(storage_key: &str) -> RepoResult<&'static str> {
    match storage_key {
        DAILY_STORAGE_KEY => Ok(DAILY_STORAGE_KEY),
        QUARTERLY_STORAGE_KEY => Ok(QUARTERLY_STORAGE_KEY),
        other => Err(RepoError::InvalidData(format!(
            "unknown storage key `{other}`; expected {DAILY_STORAGE_KEY}|{QUARTERLY_STORAGE_KEY}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::JournalStore;
    use crate::db::open_db_in_memory;
    use crate::model::daily_entry::DailyEntry;
    use crate::model::ids::DateId;
    use crate::model::record::{DAILY_STORAGE_KEY, QUARTERLY_STORAGE_KEY};
    use crate::repo::blob_store::{BlobStore, RepoError, SqliteBlobStore};

    fn store() -> JournalStore<SqliteBlobStore> {
        JournalStore::new(SqliteBlobStore::new(open_db_in_memory().unwrap()))
    }

    #[test]
    fn corrupt_blob_reads_as_empty_namespace() {
        let store = store();
        store
            .blobs()
            .write_blob(DAILY_STORAGE_KEY, "{not json")
            .unwrap();
        assert!(store.daily_entries().is_empty());
    }

    #[test]
    fn upsert_over_corrupt_blob_starts_fresh() {
        let store = store();
        store.blobs().write_blob(DAILY_STORAGE_KEY, "[1,2").unwrap();

        let entry = DailyEntry::new(DateId::from_ymd(2024, 6, 10).unwrap());
        let records = store.upsert_daily_entry(&entry).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(store.daily_entries().len(), 1);
    }

    #[test]
    fn undecodable_record_is_skipped_but_not_dropped_on_upsert() {
        let store = store();
        store
            .blobs()
            .write_blob(
                DAILY_STORAGE_KEY,
                r#"{"2024-06-09": {"date": "2024-06-09", "mood": "ecstatic"}}"#,
            )
            .unwrap();
        assert!(store.daily_entries().is_empty());

        let entry = DailyEntry::new(DateId::from_ymd(2024, 6, 10).unwrap());
        let records = store.upsert_daily_entry(&entry).unwrap();
        assert_eq!(records.keys().collect::<Vec<_>>(), vec!["2024-06-10"]);

        let blob = store.blobs().read_blob(DAILY_STORAGE_KEY).unwrap().unwrap();
        assert!(blob.contains(r#""mood":"ecstatic""#));
    }

    #[test]
    fn export_of_untouched_namespace_is_empty_object() {
        assert_eq!(store().export_namespace(QUARTERLY_STORAGE_KEY).unwrap(), "{}");
    }

    #[test]
    fn unknown_storage_key_is_rejected() {
        let err = store().export_namespace("gentle_self_weekly").unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn import_rejects_mismatched_keys_without_writing() {
        let store = store();
        let blob = r#"{"2024-06-11": {"date": "2024-06-10"}}"#;
        let err = store.import_namespace(DAILY_STORAGE_KEY, blob).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
        assert_eq!(store.blobs().read_blob(DAILY_STORAGE_KEY).unwrap(), None);
    }
}
