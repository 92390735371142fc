//! Completed work-phase log
//!
//! One JSON line per finished or abandoned work phase, appended to
//! `history.jsonl` next to the state file.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pomodoro_core::Paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::state::SessionState;

/// A work phase that has ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Configured work length
    pub planned_seconds: u64,
    /// Time actually spent counting down
    pub focused_seconds: u64,
    pub task: Option<String>,
    /// Reached zero rather than being canceled or stopped
    pub completed: bool,
}

impl CompletedSession {
    /// Entry for a work phase ending at `now` with `remaining` seconds left
    pub fn from_state(state: &SessionState, remaining: u64, now: DateTime<Utc>, completed: bool) -> Self {
        Self {
            started_at: state.started_at,
            ended_at: now,
            planned_seconds: state.work_seconds,
            focused_seconds: state.work_seconds.saturating_sub(remaining),
            task: state.task.clone(),
            completed,
        }
    }
}

/// Append-only history file
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(paths: &Paths) -> Self {
        Self::at(paths.history_file())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry
    pub fn record(&self, entry: &CompletedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create history directory: {}", parent.display()))?;
        }

        let line = serde_json::to_string(entry).context("Failed to serialize history entry")?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open history: {}", self.path.display()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write history: {}", self.path.display()))
    }

    /// Entries that ended at or after `since`, oldest first
    pub fn since(&self, since: DateTime<Utc>) -> Result<Vec<CompletedSession>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open history: {}", self.path.display()))
            }
        };

        let mut sessions = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {} of history", line_num + 1))?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<CompletedSession>(&line) {
                Ok(entry) if entry.ended_at >= since => sessions.push(entry),
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping history line {}: {}", line_num + 1, e),
            }
        }

        sessions.sort_by_key(|s| s.started_at);
        Ok(sessions)
    }
}
