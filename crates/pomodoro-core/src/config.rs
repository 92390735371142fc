//! User configuration for the pomodoro tools
//!
//! Read from `config.json`; every field is optional and falls back to the
//! classic 25/5/15 rhythm with a long break every fourth session.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Default durations and checkpoint cadence
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Work phase length in minutes
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    /// Short break length in minutes
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,

    /// Long break length in minutes
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,

    /// Work sessions per cycle; the last one is followed by a long break
    #[serde(default = "default_sessions")]
    pub sessions: u32,

    /// Persist remaining time every N ticks while counting down
    #[serde(default = "default_persist_every")]
    pub persist_every: u32,
}

fn default_work_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

fn default_long_break_minutes() -> u32 {
    15
}

fn default_sessions() -> u32 {
    4
}

fn default_persist_every() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            sessions: default_sessions(),
            persist_every: default_persist_every(),
        }
    }
}

impl Config {
    /// Load config from file, or defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}
