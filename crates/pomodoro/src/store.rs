//! Session state storage
//!
//! A single JSON file holds the one session record. Writes go through a
//! sibling temp file and a rename so readers never see a half-written record.

use pomodoro_core::Paths;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PomodoroError, Result};
use crate::state::SessionState;

/// Load/save access to `state.json`
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store at the standard per-user location
    pub fn new(paths: &Paths) -> Self {
        Self::at(paths.state_file())
    }

    /// Store at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<SessionState>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PomodoroError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let state: SessionState =
            serde_json::from_str(&content).map_err(|source| PomodoroError::Parse {
                path: self.path.clone(),
                source,
            })?;

        state.validate().map_err(|msg| PomodoroError::Parse {
            path: self.path.clone(),
            source: serde::de::Error::custom(msg),
        })?;

        Ok(Some(state))
    }

    /// Write the record, creating parent directories as needed
    pub fn save(&self, state: &SessionState) -> Result<()> {
        self.write(state).map_err(|source| PomodoroError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(
            path = %self.path.display(),
            running = state.running,
            paused = state.paused,
            remaining = state.remaining_seconds,
            "state saved"
        );
        Ok(())
    }

    fn write(&self, state: &SessionState) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut content = serde_json::to_string_pretty(state)?;
        content.push('\n');

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample() -> SessionState {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        SessionState::start_work(1500, 300, 900, 4, Some("Test task".to_string()), now)
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::at(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::at(dir.path().join("deep").join("pomodoro").join("state.json"));

        let state = sample();
        store.save(&state).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::at(dir.path().join("state.json"));

        let mut state = sample();
        store.save(&state).unwrap();
        state.running = false;
        state.remaining_seconds = 7;
        store.save(&state).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert!(!loaded.running);
        assert_eq!(loaded.remaining_seconds, 7);
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"version\": 1,").unwrap();

        let err = StateStore::at(&path).load().unwrap_err();
        assert!(matches!(err, PomodoroError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn test_out_of_range_remaining_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut value = serde_json::to_value(sample()).unwrap();
        value["paused"] = serde_json::json!(true);
        value["paused_at"] = value["started_at"].clone();
        value["remaining_seconds"] = serde_json::json!(10_000_000_000_000_000_u64);
        fs::write(&path, value.to_string()).unwrap();

        let err = StateStore::at(&path).load().unwrap_err();
        assert!(matches!(err, PomodoroError::Parse { .. }), "got {err:?}");

        value["remaining_seconds"] = serde_json::json!(u64::MAX);
        fs::write(&path, value.to_string()).unwrap();
        let err = StateStore::at(&path).load().unwrap_err();
        assert!(matches!(err, PomodoroError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn test_directory_in_place_of_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::create_dir(&path).unwrap();

        let err = StateStore::at(&path).load().unwrap_err();
        assert!(matches!(err, PomodoroError::Read { .. }), "got {err:?}");
    }

    #[test]
    fn test_unwritable_parent_is_write_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let store = StateStore::at(blocker.join("state.json"));
        let err = store.save(&sample()).unwrap_err();
        assert!(matches!(err, PomodoroError::Write { .. }), "got {err:?}");
    }

    #[test]
    fn test_reads_record_with_offset_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{
  "version": 1,
  "running": true,
  "mode": "long_break",
  "task": "",
  "session_index": 4,
  "sessions_total": 4,
  "work_seconds": 1500,
  "break_seconds": 300,
  "long_break_seconds": 900,
  "started_at": "2024-01-02T03:04:05+00:00",
  "ends_at": "2024-01-02T03:19:05Z",
  "paused": false,
  "paused_at": null,
  "remaining_seconds": 900
}"#,
        )
        .unwrap();

        let state = StateStore::at(&path).load().unwrap().unwrap();
        assert_eq!(state.mode, crate::state::Mode::LongBreak);
        assert_eq!(state.session_index, 4);
        assert_eq!((state.ends_at - state.started_at).num_seconds(), 900);
    }
}
