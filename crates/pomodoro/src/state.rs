//! The persisted session record
//!
//! One `SessionState` exists per user. It is created by `start`, mutated in
//! place by every other command and never deleted: a missing file means "no
//! session", which is different from a stopped record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Schema tag written into every record
pub const STATE_VERSION: u32 = 1;

/// Upper bound for any stored duration (about 68 years); keeps deadline
/// arithmetic inside chrono's range
pub const MAX_SECONDS: u64 = i32::MAX as u64;

/// Phase of the pomodoro cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Work,
    Break,
    LongBreak,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::Break => "break",
            Mode::LongBreak => "long_break",
        }
    }

    /// Human label, e.g. for "Long break time."
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Work => "Work",
            Mode::Break => "Break",
            Mode::LongBreak => "Long break",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle position of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stopped,
    Running,
    Paused,
}

/// Persisted session state (`state.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub version: u32,
    /// A countdown is active (possibly paused)
    pub running: bool,
    pub mode: Mode,
    #[serde(default)]
    pub task: Option<String>,
    /// 1-based position within the cycle
    pub session_index: u32,
    pub sessions_total: u32,
    pub work_seconds: u64,
    pub break_seconds: u64,
    pub long_break_seconds: u64,
    pub started_at: DateTime<Utc>,
    /// Deadline of the current phase; authoritative while running unpaused
    pub ends_at: DateTime<Utc>,
    pub paused: bool,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// Frozen while paused, otherwise the last checkpointed value
    pub remaining_seconds: u64,
}

/// Whole seconds from `now` until `deadline`, never negative
pub fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (deadline - now).num_seconds().max(0) as u64
}

fn after(now: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
    now + Duration::seconds(seconds as i64)
}

impl SessionState {
    /// Check invariants serde cannot express. Returns a description of the
    /// first violation.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let durations = [
            ("work_seconds", self.work_seconds),
            ("break_seconds", self.break_seconds),
            ("long_break_seconds", self.long_break_seconds),
            ("remaining_seconds", self.remaining_seconds),
        ];
        for (name, value) in durations {
            if value > MAX_SECONDS {
                return Err(format!("{} out of range: {}", name, value));
            }
        }
        if self.paused && !self.running {
            return Err("paused session is not running".to_string());
        }
        Ok(())
    }

    /// Same phase as `other`, ignoring the cached remaining time
    pub fn same_phase(&self, other: &SessionState) -> bool {
        let mut other = other.clone();
        other.remaining_seconds = self.remaining_seconds;
        *self == other
    }

    /// Fresh running work phase, first session of the cycle
    pub fn start_work(
        work_seconds: u64,
        break_seconds: u64,
        long_break_seconds: u64,
        sessions_total: u32,
        task: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            version: STATE_VERSION,
            running: true,
            mode: Mode::Work,
            task: task.filter(|t| !t.trim().is_empty()),
            session_index: 1,
            sessions_total,
            work_seconds,
            break_seconds,
            long_break_seconds,
            started_at: now,
            ends_at: after(now, work_seconds),
            paused: false,
            paused_at: None,
            remaining_seconds: work_seconds,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.running, self.paused) {
            (false, _) => Phase::Stopped,
            (true, true) => Phase::Paused,
            (true, false) => Phase::Running,
        }
    }

    /// Configured length of a phase
    pub fn duration_of(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Work => self.work_seconds,
            Mode::Break => self.break_seconds,
            Mode::LongBreak => self.long_break_seconds,
        }
    }

    /// Break that follows the current work session
    pub fn next_break(&self) -> Mode {
        if self.sessions_total > 0 && self.session_index % self.sessions_total == 0 {
            Mode::LongBreak
        } else {
            Mode::Break
        }
    }

    /// Remaining time as of `now`: frozen value while paused, deadline-derived
    /// while running
    pub fn live_remaining(&self, now: DateTime<Utc>) -> u64 {
        if self.paused {
            self.remaining_seconds
        } else {
            seconds_until(self.ends_at, now)
        }
    }

    /// Deadline as seen by the user; a paused phase ends `remaining` after now
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.paused {
            after(now, self.remaining_seconds)
        } else {
            self.ends_at
        }
    }

    /// Running, unpaused, and past its deadline
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.running && !self.paused && self.ends_at < now
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.remaining_seconds = seconds_until(self.ends_at, now);
        self.paused = true;
        self.paused_at = Some(now);
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.paused = false;
        self.paused_at = None;
        self.started_at = now;
        self.ends_at = after(now, self.remaining_seconds);
    }

    /// Close the current work phase and stage the following break. The
    /// record is left stopped; returns the staged mode.
    pub fn complete_work(&mut self, now: DateTime<Utc>) -> Mode {
        let next = self.next_break();
        let seconds = self.duration_of(next);

        self.mode = next;
        self.running = false;
        self.paused = false;
        self.paused_at = None;
        self.started_at = now;
        self.ends_at = after(now, seconds);
        self.remaining_seconds = seconds;
        next
    }

    /// Stop with `remaining` kept as the last known value
    pub fn halt(&mut self, remaining: u64) {
        self.running = false;
        self.paused = false;
        self.paused_at = None;
        self.remaining_seconds = remaining;
    }
}
