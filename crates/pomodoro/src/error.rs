//! Error types for pomodoro operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pomodoro command
#[derive(Error, Debug)]
pub enum PomodoroError {
    #[error("failed to read state file {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse state file {}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write state file {}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("a session is already running (use --force to replace it)")]
    AlreadyRunning,

    #[error("countdown canceled with {remaining}s remaining")]
    Canceled { remaining: u64 },

    /// The record on disk was paused, stopped or replaced by another
    /// invocation while this one was counting down
    #[error("session changed by another invocation with {remaining}s remaining")]
    Superseded { remaining: u64 },
}

impl PomodoroError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, PomodoroError::Canceled { .. })
    }
}

pub type Result<T> = std::result::Result<T, PomodoroError>;
