//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Own the single process-wide journal session (store + view holders).
//! - Expose field-level edits, snapshots and the autosave tick to Dart via FRB.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call other than `journal_open` fails softly while no session is open.
//! - The host calls `journal_tick` from its frame/timer loop to drive autosave.

use gentle_core::db::open_db;
use gentle_core::{
    core_version as core_version_inner, current_quarter_id, default_log_level,
    init_logging as init_logging_inner, today_id, weekly_stats_from_store, AutosaveConfig,
    CommitOutcome, DailyJournal, DateId, JournalStore, Mood, QuarterId, QuarterlyField,
    QuarterlyJournal, SaveStatus, SqliteBlobStore,
};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Instant;

const DB_PATH_ENV: &str = "GENTLE_SELF_DB_PATH";
const DB_DIR_NAME: &str = "gentle_self";
const DB_FILE_NAME: &str = "gentle_self.sqlite3";

static SESSION: OnceLock<Mutex<Option<JournalSession>>> = OnceLock::new();

struct JournalSession {
    db_path: PathBuf,
    config: AutosaveConfig,
    store: JournalStore<SqliteBlobStore>,
    daily: DailyJournal,
    quarterly: QuarterlyJournal,
}

impl JournalSession {
    fn open(db_path: PathBuf) -> Result<Self, String> {
        let conn = open_db(&db_path).map_err(|err| format!("journal DB open failed: {err}"))?;
        let store = JournalStore::new(SqliteBlobStore::new(conn));
        let config = AutosaveConfig::default();
        let daily = DailyJournal::open_today(&store, &config);
        let quarterly = QuarterlyJournal::open_current(&store, &config);
        Ok(Self {
            db_path,
            config,
            store,
            daily,
            quarterly,
        })
    }

    /// Moves the daily holder to the new local day after midnight.
    fn roll_daily_if_stale(&mut self) -> Result<(), String> {
        self.roll_daily_to(today_id())
    }

    /// Saves the open day before switching to `today`.
    ///
    /// When that save fails the holder stays on its own day with its edit and
    /// `failed` status, and the error is returned.
    fn roll_daily_to(&mut self, today: DateId) -> Result<(), String> {
        if !self.daily.is_stale(today) {
            return Ok(());
        }
        if let Some(CommitOutcome::Failed(err)) = self.daily.flush(&self.store) {
            warn!(
                "event=daily_rollover module=ffi status=error date={} error={}",
                self.daily.date(),
                err
            );
            return Err(format!(
                "edits for {} could not be saved: {err}",
                self.daily.date()
            ));
        }
        info!(
            "event=daily_rollover module=ffi status=ok from={} to={}",
            self.daily.date(),
            today
        );
        self.daily = DailyJournal::open(&self.store, today, &self.config);
        Ok(())
    }

    fn flush_all(&mut self) -> Vec<String> {
        let mut failures = Vec::new();
        if let Some(CommitOutcome::Failed(err)) = self.daily.flush(&self.store) {
            failures.push(format!("daily: {err}"));
        }
        if let Some(CommitOutcome::Failed(err)) = self.quarterly.flush(&self.store) {
            failures.push(format!("quarterly: {err}"));
        }
        failures
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl JournalActionResponse {
    fn from_result(result: Result<String, String>) -> Self {
        match result {
            Ok(message) => Self { ok: true, message },
            Err(message) => Self { ok: false, message },
        }
    }
}

/// Today's draft as shown by the daily view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyView {
    pub date: String,
    pub future_step: bool,
    pub body_presence: bool,
    pub life_moment: bool,
    /// `calm|ordinary|tired|low`, or `None` when unset.
    pub mood: Option<String>,
    pub mental_noise: String,
    pub note: String,
    /// `saved|unsaved|failed`.
    pub save_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySnapshotResponse {
    pub view: Option<DailyView>,
    pub message: String,
}

/// Selected quarter's draft plus the quarter picker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterlyView {
    pub quarter: String,
    pub current_quarter: String,
    pub is_current: bool,
    /// Viewable quarters, newest first.
    pub options: Vec<String>,
    pub intention: String,
    pub intention_reflection: String,
    pub carry_over_assets: String,
    pub proof_of_progress: String,
    pub next_small_adjustment: String,
    /// RFC 3339 commit time, `None` until first saved.
    pub updated_at: Option<String>,
    pub save_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterlySnapshotResponse {
    pub view: Option<QuarterlyView>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterOptionsResponse {
    pub options: Vec<String>,
    pub message: String,
}

/// Seven-day rollup ending today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyView {
    /// Window days, oldest first.
    pub window: Vec<String>,
    pub future_step: u32,
    pub body_presence: u32,
    pub life_moment: u32,
    pub calm: u32,
    pub ordinary: u32,
    pub tired: u32,
    pub low: u32,
    pub days_recorded: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySnapshotResponse {
    pub view: Option<WeeklyView>,
    pub message: String,
}

/// Result of one autosave tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalTickResponse {
    pub ok: bool,
    /// Number of records committed by this tick.
    pub committed: u32,
    pub daily_status: String,
    pub quarterly_status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceExportResponse {
    pub ok: bool,
    /// Raw JSON mapping, empty on failure.
    pub json: String,
    pub message: String,
}

/// Exposes the core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// An empty `level` picks the build default. Returns an empty string on
/// success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match level.trim() {
        "" => default_log_level(),
        explicit => explicit,
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens (or re-opens) the journal session.
///
/// `db_path` overrides the location; otherwise `GENTLE_SELF_DB_PATH`, then the
/// platform data directory. An already open session is flushed first; if
/// that fails the previous session stays open and the call fails.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_open(db_path: Option<String>) -> JournalActionResponse {
    let path = resolve_db_path(db_path.as_deref());
    let mut guard = lock_session();
    if let Some(previous) = guard.as_mut() {
        let failures = previous.flush_all();
        if !failures.is_empty() {
            warn!(
                "event=journal_open module=ffi status=error error_code=flush_failed failures={}",
                failures.len()
            );
            return JournalActionResponse::from_result(Err(format!(
                "open journal kept; pending edits could not be saved: {}",
                failures.join("; ")
            )));
        }
    }

    let result = JournalSession::open(path).map(|session| {
        let message = format!("Journal opened at {}.", session.db_path.display());
        info!("event=journal_open module=ffi status=ok");
        *guard = Some(session);
        message
    });
    JournalActionResponse::from_result(result)
}

/// Flushes pending edits and closes the session.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_close() -> JournalActionResponse {
    let mut guard = lock_session();
    let result = match guard.take() {
        Some(mut session) => {
            let failures = session.flush_all();
            if failures.is_empty() {
                Ok("Journal closed.".to_string())
            } else {
                Err(format!("journal closed with unsaved edits: {}", failures.join("; ")))
            }
        }
        None => Ok("Journal was not open.".to_string()),
    };
    JournalActionResponse::from_result(result)
}

/// Returns today's draft.
#[flutter_rust_bridge::frb(sync)]
pub fn daily_snapshot() -> DailySnapshotResponse {
    match with_session(|session| {
        // A failed rollover keeps showing the unsaved day with `failed` status.
        let _ = session.roll_daily_if_stale();
        Ok(daily_view(&session.daily))
    }) {
        Ok(view) => DailySnapshotResponse {
            view: Some(view),
            message: String::new(),
        },
        Err(message) => DailySnapshotResponse {
            view: None,
            message: format!("daily_snapshot failed: {message}"),
        },
    }
}

/// Sets one habit flag: `future_step|body_presence|life_moment`.
#[flutter_rust_bridge::frb(sync)]
pub fn daily_set_habit(habit: String, done: bool) -> JournalActionResponse {
    let result = with_session(|session| {
        session.roll_daily_if_stale()?;
        let now = Instant::now();
        match habit.trim() {
            "future_step" => session.daily.set_future_step(done, now),
            "body_presence" => session.daily.set_body_presence(done, now),
            "life_moment" => session.daily.set_life_moment(done, now),
            other => return Err(format!("unknown habit `{other}`")),
        }
        Ok(session.daily.save_status().as_str().to_string())
    });
    JournalActionResponse::from_result(result)
}

/// Sets or clears (`None`) today's mood.
#[flutter_rust_bridge::frb(sync)]
pub fn daily_set_mood(mood: Option<String>) -> JournalActionResponse {
    let result = parse_mood(mood.as_deref()).and_then(|mood| {
        with_session(|session| {
            session.roll_daily_if_stale()?;
            session.daily.set_mood(mood, Instant::now());
            Ok(session.daily.save_status().as_str().to_string())
        })
    });
    JournalActionResponse::from_result(result)
}

/// Replaces one text field: `mental_noise|note`.
#[flutter_rust_bridge::frb(sync)]
pub fn daily_set_text(field: String, text: String) -> JournalActionResponse {
    let result = with_session(|session| {
        session.roll_daily_if_stale()?;
        let now = Instant::now();
        match field.trim() {
            "mental_noise" => session.daily.set_mental_noise(text, now),
            "note" => session.daily.set_note(text, now),
            other => return Err(format!("unknown daily text field `{other}`")),
        }
        Ok(session.daily.save_status().as_str().to_string())
    });
    JournalActionResponse::from_result(result)
}

/// Returns the selected quarter's draft and the quarter options.
#[flutter_rust_bridge::frb(sync)]
pub fn quarterly_snapshot() -> QuarterlySnapshotResponse {
    match with_session(|session| Ok(quarterly_view(&session.quarterly))) {
        Ok(view) => QuarterlySnapshotResponse {
            view: Some(view),
            message: String::new(),
        },
        Err(message) => QuarterlySnapshotResponse {
            view: None,
            message: format!("quarterly_snapshot failed: {message}"),
        },
    }
}

/// Quarters the picker offers, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn quarterly_options() -> QuarterOptionsResponse {
    match with_session(|session| {
        Ok(session
            .quarterly
            .quarter_options()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>())
    }) {
        Ok(options) => QuarterOptionsResponse {
            options,
            message: String::new(),
        },
        Err(message) => QuarterOptionsResponse {
            options: Vec::new(),
            message: format!("quarterly_options failed: {message}"),
        },
    }
}

/// Switches the viewed quarter (`YYYY-QN`).
#[flutter_rust_bridge::frb(sync)]
pub fn quarterly_select(quarter: String) -> JournalActionResponse {
    let result = quarter
        .parse::<QuarterId>()
        .map_err(|err| err.to_string())
        .and_then(|quarter| {
            with_session(|session| {
                match session.quarterly.select(quarter, &session.store) {
                    Some(CommitOutcome::Failed(err)) => {
                        Err(format!("pending edit could not be saved: {err}"))
                    }
                    _ => Ok(format!("Viewing {}.", session.quarterly.selected())),
                }
            })
        });
    JournalActionResponse::from_result(result)
}

/// Replaces one quarterly text field of the selected quarter.
#[flutter_rust_bridge::frb(sync)]
pub fn quarterly_set_field(field: String, text: String) -> JournalActionResponse {
    let result = field.parse::<QuarterlyField>().and_then(|field| {
        with_session(|session| {
            session.quarterly.set_field(field, text, Instant::now());
            Ok(session.quarterly.save_status().as_str().to_string())
        })
    });
    JournalActionResponse::from_result(result)
}

/// Returns the seven-day rollup ending today.
#[flutter_rust_bridge::frb(sync)]
pub fn weekly_snapshot() -> WeeklySnapshotResponse {
    match with_session(|session| Ok(weekly_stats_from_store(&session.store, today_id()))) {
        Ok(stats) => WeeklySnapshotResponse {
            view: Some(WeeklyView {
                window: stats.window.iter().map(ToString::to_string).collect(),
                future_step: stats.habit_counts.future_step,
                body_presence: stats.habit_counts.body_presence,
                life_moment: stats.habit_counts.life_moment,
                calm: stats.mood_counts.calm,
                ordinary: stats.mood_counts.ordinary,
                tired: stats.mood_counts.tired,
                low: stats.mood_counts.low,
                days_recorded: stats.days_recorded,
            }),
            message: String::new(),
        },
        Err(message) => WeeklySnapshotResponse {
            view: None,
            message: format!("weekly_snapshot failed: {message}"),
        },
    }
}

/// Drives both autosave timers; call periodically from the host loop.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_tick() -> JournalTickResponse {
    let result = with_session(|session| {
        let now = Instant::now();
        let outcomes = [
            session.daily.poll(now, &session.store).map(|o| describe("daily", o)),
            session
                .quarterly
                .poll(now, &session.store)
                .map(|o| describe("quarterly", o)),
        ];
        Ok((outcomes, session.daily.save_status(), session.quarterly.save_status()))
    });

    match result {
        Ok((outcomes, daily_status, quarterly_status)) => {
            let committed = outcomes.iter().flatten().filter(|o| o.is_ok()).count() as u32;
            let failures = outcomes
                .iter()
                .flatten()
                .filter_map(|o| o.as_ref().err().cloned())
                .collect::<Vec<_>>();
            JournalTickResponse {
                ok: failures.is_empty(),
                committed,
                daily_status: daily_status.as_str().to_string(),
                quarterly_status: quarterly_status.as_str().to_string(),
                message: failures.join("; "),
            }
        }
        Err(message) => JournalTickResponse {
            ok: false,
            committed: 0,
            daily_status: SaveStatus::Saved.as_str().to_string(),
            quarterly_status: SaveStatus::Saved.as_str().to_string(),
            message: format!("journal_tick failed: {message}"),
        },
    }
}

/// Commits every pending edit immediately (e.g. app going to background).
#[flutter_rust_bridge::frb(sync)]
pub fn journal_flush() -> JournalActionResponse {
    let result = with_session(|session| {
        let failures = session.flush_all();
        if failures.is_empty() {
            Ok("All edits saved.".to_string())
        } else {
            Err(failures.join("; "))
        }
    });
    JournalActionResponse::from_result(result)
}

/// Exports a namespace blob (`gentle_self_daily|gentle_self_quarterly`).
#[flutter_rust_bridge::frb(sync)]
pub fn export_namespace(storage_key: String) -> NamespaceExportResponse {
    match with_session(|session| {
        let failures = session.flush_all();
        if !failures.is_empty() {
            return Err(format!("pending edits could not be saved: {}", failures.join("; ")));
        }
        session
            .store
            .export_namespace(storage_key.trim())
            .map_err(|err| err.to_string())
    }) {
        Ok(json) => NamespaceExportResponse {
            ok: true,
            json,
            message: String::new(),
        },
        Err(message) => NamespaceExportResponse {
            ok: false,
            json: String::new(),
            message: format!("export_namespace failed: {message}"),
        },
    }
}

/// Replaces a namespace with an imported blob and reloads both holders.
#[flutter_rust_bridge::frb(sync)]
pub fn import_namespace(storage_key: String, json: String) -> JournalActionResponse {
    let result = with_session(|session| {
        let failures = session.flush_all();
        if !failures.is_empty() {
            return Err(format!("pending edits could not be saved: {}", failures.join("; ")));
        }
        let imported = session
            .store
            .import_namespace(storage_key.trim(), &json)
            .map_err(|err| err.to_string())?;
        let selected = session.quarterly.selected();
        session.daily = DailyJournal::open(&session.store, session.daily.date(), &session.config);
        session.quarterly =
            QuarterlyJournal::open(&session.store, current_quarter_id(), &session.config);
        session.quarterly.select(selected, &session.store);
        Ok(format!("Imported {imported} record(s)."))
    });
    JournalActionResponse::from_result(result)
}

fn describe<R>(namespace: &str, outcome: CommitOutcome<R>) -> Result<(), String> {
    match outcome {
        CommitOutcome::Committed { .. } => Ok(()),
        CommitOutcome::Failed(err) => Err(format!("{namespace}: {err}")),
    }
}

fn daily_view(journal: &DailyJournal) -> DailyView {
    let entry = journal.draft();
    DailyView {
        date: entry.date.to_string(),
        future_step: entry.future_step,
        body_presence: entry.body_presence,
        life_moment: entry.life_moment,
        mood: entry.mood.map(|mood| mood.as_str().to_string()),
        mental_noise: entry.mental_noise.clone(),
        note: entry.note.clone(),
        save_status: journal.save_status().as_str().to_string(),
    }
}

fn quarterly_view(journal: &QuarterlyJournal) -> QuarterlyView {
    let review = journal.draft();
    QuarterlyView {
        quarter: review.id.to_string(),
        current_quarter: journal.current().to_string(),
        is_current: journal.is_viewing_current(),
        options: journal
            .quarter_options()
            .iter()
            .map(ToString::to_string)
            .collect(),
        intention: review.field(QuarterlyField::Intention).to_owned(),
        intention_reflection: review.field(QuarterlyField::IntentionReflection).to_owned(),
        carry_over_assets: review.field(QuarterlyField::CarryOverAssets).to_owned(),
        proof_of_progress: review.field(QuarterlyField::ProofOfProgress).to_owned(),
        next_small_adjustment: review.field(QuarterlyField::NextSmallAdjustment).to_owned(),
        updated_at: review.updated_at.map(|at| at.to_rfc3339()),
        save_status: journal.save_status().as_str().to_string(),
    }
}

fn parse_mood(raw: Option<&str>) -> Result<Option<Mood>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<Mood>().map(Some),
    }
}

fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    let from_env = std::env::var(DB_PATH_ENV).ok();
    resolve_db_path_from(explicit, from_env.as_deref(), dirs::data_local_dir().as_deref())
}

fn resolve_db_path_from(
    explicit: Option<&str>,
    from_env: Option<&str>,
    data_dir: Option<&Path>,
) -> PathBuf {
    if let Some(path) = [explicit, from_env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|path| !path.is_empty())
    {
        return PathBuf::from(path);
    }
    data_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir)
        .join(DB_DIR_NAME)
        .join(DB_FILE_NAME)
}

fn lock_session() -> MutexGuard<'static, Option<JournalSession>> {
    SESSION
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_session<T>(
    f: impl FnOnce(&mut JournalSession) -> Result<T, String>,
) -> Result<T, String> {
    let mut guard = lock_session();
    let session = guard
        .as_mut()
        .ok_or_else(|| "journal is not open; call journal_open first".to_string())?;
    f(session)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, daily_set_habit, daily_set_mood, daily_set_text, daily_snapshot,
        daily_view, export_namespace, import_namespace, init_logging, journal_close,
        journal_flush, journal_open, parse_mood, quarterly_options, quarterly_select,
        quarterly_set_field,
        quarterly_snapshot, resolve_db_path_from, weekly_snapshot, with_session, JournalSession,
    };
    use gentle_core::{current_quarter_id, today_id, DateId, Mood, SaveStatus};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Instant;

    // The session is process-wide; tests touching it run one at a time.
    static SESSION_TESTS: Mutex<()> = Mutex::new(());

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn db_path_prefers_explicit_then_env_then_data_dir() {
        let data_dir = Path::new("/data");
        assert_eq!(
            resolve_db_path_from(Some("/tmp/a.sqlite3"), Some("/tmp/b.sqlite3"), Some(data_dir)),
            PathBuf::from("/tmp/a.sqlite3")
        );
        assert_eq!(
            resolve_db_path_from(Some("  "), Some("/tmp/b.sqlite3"), Some(data_dir)),
            PathBuf::from("/tmp/b.sqlite3")
        );
        assert_eq!(
            resolve_db_path_from(None, None, Some(data_dir)),
            PathBuf::from("/data/gentle_self/gentle_self.sqlite3")
        );
    }

    #[test]
    fn parse_mood_accepts_clear_and_known_values() {
        assert_eq!(parse_mood(None), Ok(None));
        assert_eq!(parse_mood(Some(" ")), Ok(None));
        assert_eq!(parse_mood(Some("low")), Ok(Some(Mood::Low)));
        assert!(parse_mood(Some("grumpy")).is_err());
    }

    #[test]
    fn calls_fail_softly_without_session() {
        let _guard = SESSION_TESTS.lock().unwrap_or_else(|p| p.into_inner());
        journal_close();

        let snapshot = daily_snapshot();
        assert!(snapshot.view.is_none());
        assert!(snapshot.message.contains("journal_open"));
        assert!(!daily_set_habit("future_step".to_string(), true).ok);
        assert!(weekly_snapshot().view.is_none());
        assert!(quarterly_options().message.contains("journal_open"));
    }

    fn set_read_only(session: &JournalSession, read_only: bool) {
        let pragma = if read_only {
            "PRAGMA query_only = ON;"
        } else {
            "PRAGMA query_only = OFF;"
        };
        session
            .store
            .blobs()
            .connection()
            .execute_batch(pragma)
            .expect("toggle query_only");
    }

    #[test]
    fn midnight_rollover_keeps_unsaved_day_when_save_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut session =
            JournalSession::open(dir.path().join("rollover.sqlite3")).expect("session");
        let opened_on = session.daily.date();
        let next_day: DateId = "2999-01-01".parse().expect("valid date");

        session.daily.set_note("late thought", Instant::now());
        set_read_only(&session, true);

        assert!(session.roll_daily_to(next_day).is_err());
        assert_eq!(session.daily.date(), opened_on);
        assert_eq!(session.daily.draft().note, "late thought");
        assert_eq!(daily_view(&session.daily).save_status, "failed");

        set_read_only(&session, false);
        session.roll_daily_to(next_day).expect("rollover once writable");
        assert_eq!(session.daily.date(), next_day);
        assert_eq!(session.daily.save_status(), SaveStatus::Saved);
        assert_eq!(
            session.store.daily_entries()[&opened_on.to_string()].note,
            "late thought"
        );
    }

    #[test]
    fn rollover_to_same_day_is_a_no_op() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut session = JournalSession::open(dir.path().join("same.sqlite3")).expect("session");
        let today = session.daily.date();
        session.daily.set_note("still typing", Instant::now());

        session.roll_daily_to(today).expect("no rollover");
        assert_eq!(session.daily.save_status(), SaveStatus::Unsaved);
    }

    #[test]
    fn export_and_reopen_refuse_while_edits_cannot_be_saved() {
        let _guard = SESSION_TESTS.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().expect("temp dir");
        let path_str = dir
            .path()
            .join("blocked.sqlite3")
            .to_str()
            .expect("utf-8 path")
            .to_string();

        assert!(journal_open(Some(path_str.clone())).ok);
        assert!(daily_set_text("note".to_string(), "unsaved thought".to_string()).ok);
        with_session(|session| {
            set_read_only(session, true);
            Ok(())
        })
        .expect("open session");

        let exported = export_namespace("gentle_self_daily".to_string());
        assert!(!exported.ok);
        assert!(exported.json.is_empty());

        let reopened = journal_open(Some(path_str));
        assert!(!reopened.ok);
        let daily = daily_snapshot().view.expect("daily view");
        assert_eq!(daily.note, "unsaved thought");
        assert_eq!(daily.save_status, "failed");

        with_session(|session| {
            set_read_only(session, false);
            Ok(())
        })
        .expect("open session");
        let exported = export_namespace("gentle_self_daily".to_string());
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.json.contains("unsaved thought"));
        assert!(journal_close().ok);
    }

    #[test]
    fn session_flow_persists_edits_across_reopen() {
        let _guard = SESSION_TESTS.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("flow.sqlite3");
        let path_str = path.to_str().expect("utf-8 path").to_string();

        let opened = journal_open(Some(path_str.clone()));
        assert!(opened.ok, "{}", opened.message);

        let edited = daily_set_habit("future_step".to_string(), true);
        assert!(edited.ok, "{}", edited.message);
        assert_eq!(edited.message, "unsaved");
        assert!(daily_set_mood(Some("calm".to_string())).ok);
        assert!(daily_set_text("note".to_string(), "tea at dusk".to_string()).ok);
        assert!(!daily_set_text("title".to_string(), "x".to_string()).ok);
        assert!(!daily_set_habit("sleep".to_string(), true).ok);

        let set = quarterly_set_field("intention".to_string(), "rest".to_string());
        assert!(set.ok, "{}", set.message);
        assert!(!quarterly_set_field("mood".to_string(), "x".to_string()).ok);

        let flushed = journal_flush();
        assert!(flushed.ok, "{}", flushed.message);

        let weekly = weekly_snapshot().view.expect("weekly view");
        assert_eq!(weekly.future_step, 1);
        assert_eq!(weekly.calm, 1);
        assert_eq!(weekly.days_recorded, 1);
        assert_eq!(weekly.window.last(), Some(&today_id().to_string()));

        let reopened = journal_open(Some(path_str));
        assert!(reopened.ok, "{}", reopened.message);
        let daily = daily_snapshot().view.expect("daily view");
        assert!(daily.future_step);
        assert_eq!(daily.mood.as_deref(), Some("calm"));
        assert_eq!(daily.note, "tea at dusk");
        assert_eq!(daily.save_status, "saved");

        let quarterly = quarterly_snapshot().view.expect("quarterly view");
        assert_eq!(quarterly.quarter, current_quarter_id().to_string());
        assert!(quarterly.is_current);
        assert_eq!(quarterly.intention, "rest");
        assert!(quarterly.updated_at.is_some());
        assert_eq!(quarterly.options, vec![current_quarter_id().to_string()]);
        assert_eq!(quarterly_options().options, quarterly.options);

        assert!(!quarterly_select("next year".to_string()).ok);

        let exported = export_namespace("gentle_self_quarterly".to_string());
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.json.contains("\"intention\":\"rest\""));
        let imported = import_namespace("gentle_self_quarterly".to_string(), exported.json);
        assert!(imported.ok, "{}", imported.message);
        assert_eq!(quarterly_snapshot().view.expect("view").intention, "rest");

        assert!(journal_close().ok);
    }
}
