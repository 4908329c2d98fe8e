//! Durable signal and progress persistence.
//!
//! Two JSON documents under the output directory:
//! - `trading_signals.json` — ISO-date-keyed map of persisted signals
//! - `progress.json` — the resume cursor and running signal count
//!
//! Every write goes to a temp file in the same directory, is fsynced, and
//! is renamed over the target, so a crash mid-write leaves the previous
//! document intact. A failed write breaks the resume guarantee and is
//! fatal upstream.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use signalback_core::domain::Signal;

const SIGNALS_FILE: &str = "trading_signals.json";
const PROGRESS_FILE: &str = "progress.json";

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("signal for {0} already persisted")]
    DuplicateSignal(NaiveDate),

    #[error("cursor regression: {attempted} is before persisted {current}")]
    CursorRegression {
        current: NaiveDate,
        attempted: NaiveDate,
    },
}

/// Resume cursor. `last_processed_date` only ever advances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub last_processed_date: Option<NaiveDate>,
    pub total_signals: usize,
}

/// Durable store for signals and the resume cursor.
///
/// The workflow is the sole writer; simulation only reads. In-memory
/// state mirrors the files, so reads never touch disk after `open`.
pub struct SignalStore {
    dir: PathBuf,
    signals: BTreeMap<NaiveDate, Signal>,
    progress: Progress,
}

impl SignalStore {
    /// Open (or initialize) a store rooted at `dir`. Creates the
    /// directory if needed and loads any existing state.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let signals = read_json_or_default::<BTreeMap<NaiveDate, Signal>>(&dir.join(SIGNALS_FILE))?;
        let progress = read_json_or_default::<Progress>(&dir.join(PROGRESS_FILE))?;

        Ok(Self {
            dir,
            signals,
            progress,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a signal exists for the exact date key.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.signals.contains_key(&date)
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// All persisted signals in date order.
    pub fn load_all(&self) -> Vec<Signal> {
        self.signals.values().cloned().collect()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Persist a new signal, keyed by its resolved date. Signals are
    /// immutable once written; a duplicate key is a caller bug.
    pub fn insert(&mut self, signal: Signal) -> Result<(), StoreError> {
        if self.signals.contains_key(&signal.date) {
            return Err(StoreError::DuplicateSignal(signal.date));
        }
        self.signals.insert(signal.date, signal);
        self.write_signals()?;
        debug!(total = self.signals.len(), "signal persisted");
        Ok(())
    }

    /// Advance the resume cursor. The cursor is monotonic: moving it
    /// backwards would re-expose already-processed dates.
    pub fn advance(&mut self, date: NaiveDate) -> Result<(), StoreError> {
        if let Some(current) = self.progress.last_processed_date {
            if date < current {
                return Err(StoreError::CursorRegression {
                    current,
                    attempted: date,
                });
            }
        }
        self.progress.last_processed_date = Some(date);
        self.progress.total_signals = self.signals.len();
        self.write_progress()
    }

    fn write_signals(&self) -> Result<(), StoreError> {
        write_json_atomic(&self.dir.join(SIGNALS_FILE), &self.signals)
    }

    fn write_progress(&self) -> Result<(), StoreError> {
        write_json_atomic(&self.dir.join(PROGRESS_FILE), &self.progress)
    }
}

fn read_json_or_default<T: Default + for<'de> Deserialize<'de>>(
    path: &Path,
) -> Result<T, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write JSON durably: temp file in the same directory, fsync, rename.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    let mut file = File::create(&tmp).map_err(io_err)?;
    file.write_all(json.as_bytes()).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use signalback_core::domain::{Decision, OracleConfigSnapshot};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn signal(d: u32) -> Signal {
        Signal {
            date: date(d),
            ticker: "QQQ".to_string(),
            decision_text: "buy".to_string(),
            decision: Decision::Buy { confidence: 0.5 },
            analysis_timestamp: Utc::now(),
            config: OracleConfigSnapshot::default(),
        }
    }

    #[test]
    fn empty_store_has_no_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::open(dir.path()).unwrap();
        assert_eq!(store.progress().last_processed_date, None);
        assert_eq!(store.signal_count(), 0);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SignalStore::open(dir.path()).unwrap();
            store.insert(signal(6)).unwrap();
            store.advance(date(6)).unwrap();
        }
        let store = SignalStore::open(dir.path()).unwrap();
        assert!(store.contains(date(6)));
        assert_eq!(store.progress().last_processed_date, Some(date(6)));
        assert_eq!(store.progress().total_signals, 1);
    }

    #[test]
    fn duplicate_insert_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SignalStore::open(dir.path()).unwrap();
        store.insert(signal(6)).unwrap();
        assert!(matches!(
            store.insert(signal(6)),
            Err(StoreError::DuplicateSignal(_))
        ));
    }

    #[test]
    fn cursor_never_regresses() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SignalStore::open(dir.path()).unwrap();
        store.advance(date(13)).unwrap();
        assert!(matches!(
            store.advance(date(6)),
            Err(StoreError::CursorRegression { .. })
        ));
        assert_eq!(store.progress().last_processed_date, Some(date(13)));
    }

    #[test]
    fn load_all_is_date_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SignalStore::open(dir.path()).unwrap();
        store.insert(signal(13)).unwrap();
        store.insert(signal(6)).unwrap();
        let all = store.load_all();
        assert_eq!(all[0].date, date(6));
        assert_eq!(all[1].date, date(13));
    }
}
