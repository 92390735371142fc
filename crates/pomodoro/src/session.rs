//! Session controller
//!
//! Drives the state machine over the single session record:
//!
//! ```text
//! Absent | Stopped --start--> Running --pause--> Paused --resume--> Running
//!                             Running --(countdown ends)--> Stopped (break staged)
//!                             any     --stop--> Stopped
//! ```
//!
//! Informational conditions (no session, already paused, not paused) are
//! outcome variants, not errors.
//!
//! A running `start` owns the record only while it is unchanged on disk.
//! Every checkpoint reloads it first; once another invocation has paused,
//! stopped or replaced it, the countdown ends without writing.

use chrono::{DateTime, Duration, Utc};
use pomodoro_core::Config;
use pomodoro_notify::Notifier;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::error::{PomodoroError, Result};
use crate::history::{CompletedSession, History};
use crate::state::{Mode, Phase, SessionState, MAX_SECONDS};
use crate::stats::SessionStats;
use crate::store::StateStore;
use crate::timer::{run_countdown, TickHandler};

/// Parameters for `start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartConfig {
    pub work_seconds: u64,
    pub break_seconds: u64,
    pub long_break_seconds: u64,
    pub sessions_total: u32,
    pub task: Option<String>,
    /// Replace a running session instead of refusing
    pub force: bool,
    /// Checkpoint every N ticks
    pub persist_every: u32,
}

impl StartConfig {
    /// Defaults from the user config file
    pub fn from_config(config: &Config) -> Self {
        Self {
            work_seconds: u64::from(config.work_minutes) * 60,
            break_seconds: u64::from(config.break_minutes) * 60,
            long_break_seconds: u64::from(config.long_break_minutes) * 60,
            sessions_total: config.sessions,
            task: None,
            force: false,
            persist_every: config.persist_every,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.work_seconds, "work duration"),
            (self.break_seconds, "break duration"),
            (self.long_break_seconds, "long break duration"),
            (u64::from(self.sessions_total), "sessions"),
            (u64::from(self.persist_every), "persist interval"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(PomodoroError::InvalidArgument(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
            if value > MAX_SECONDS {
                return Err(PomodoroError::InvalidArgument(format!(
                    "{} is too large: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// How a `start` countdown ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Ran to zero; `state` now holds the staged break
    Completed { state: SessionState, next: Mode },
    /// Interrupted; `state` holds the remaining time at interruption
    Canceled { state: SessionState },
    /// Another invocation paused, stopped or replaced the record; it was
    /// left as found (`current`)
    Superseded {
        current: Option<SessionState>,
        remaining: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseOutcome {
    NoSession,
    NotRunning,
    AlreadyPaused,
    Paused(SessionState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    NoSession,
    NotRunning,
    NotPaused,
    Resumed(SessionState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    NoSession,
    AlreadyStopped(SessionState),
    Stopped(SessionState),
}

/// Result of a `status` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    NoSession,
    Stopped(SessionState),
    /// Deadline passed without anyone observing it; the record was marked
    /// stopped and saved
    Finished(SessionState),
    Active {
        state: SessionState,
        remaining: u64,
        ends_at: DateTime<Utc>,
    },
}

/// Orchestrates transitions over the persisted record
pub struct SessionController {
    store: StateStore,
    history: History,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
}

impl SessionController {
    pub fn new(
        store: StateStore,
        history: History,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            history,
            clock,
            notifier,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Validate, create and persist a fresh running work phase
    pub fn begin(&self, config: &StartConfig) -> Result<SessionState> {
        config.validate()?;
        let now = self.clock.now();

        if let Some(existing) = self.store.load()? {
            if existing.running && !existing.is_expired(now) {
                if !config.force {
                    return Err(PomodoroError::AlreadyRunning);
                }
                tracing::info!(mode = %existing.mode, "replacing running session");
            }
        }

        let state = SessionState::start_work(
            config.work_seconds,
            config.break_seconds,
            config.long_break_seconds,
            config.sessions_total,
            config.task.clone(),
            now,
        );
        self.store.save(&state)?;
        tracing::info!(work_seconds = state.work_seconds, "work phase started");
        Ok(state)
    }

    /// Count a begun work phase down, then persist its outcome.
    ///
    /// `progress` sees every tick's remaining value. Cancellation is not an
    /// error: the remaining time is saved and `Canceled` returned. Nothing is
    /// written once the record has changed on disk.
    pub async fn run(
        &self,
        mut state: SessionState,
        persist_every: u32,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(u64),
    ) -> Result<StartOutcome> {
        let total = state.work_seconds as i64;
        let result = {
            let mut ticker = Checkpointer {
                store: &self.store,
                state: &mut state,
                progress,
            };
            run_countdown(total, persist_every, cancel, &mut ticker).await
        };

        match result {
            Ok(_) => {
                let current = self.store.load()?;
                if !owns(&current, &state) {
                    return Ok(self.superseded(current, 0));
                }

                let now = self.clock.now();
                self.record(CompletedSession::from_state(&state, 0, now, true));

                let next = state.next_break();
                self.notifier
                    .notify("Pomodoro finished!", &format!("{} time.", next.label()));

                state.complete_work(now);
                self.store.save(&state)?;
                tracing::info!(next = %next, "work phase completed");
                Ok(StartOutcome::Completed { state, next })
            }
            Err(PomodoroError::Canceled { remaining }) => {
                let current = self.store.load()?;
                if !owns(&current, &state) {
                    return Ok(self.superseded(current, remaining));
                }

                let now = self.clock.now();
                self.record(CompletedSession::from_state(&state, remaining, now, false));

                state.halt(remaining);
                self.store.save(&state)?;
                tracing::info!(remaining, "work phase canceled");
                Ok(StartOutcome::Canceled { state })
            }
            Err(PomodoroError::Superseded { remaining }) => {
                let current = self.store.load()?;
                Ok(self.superseded(current, remaining))
            }
            Err(e) => Err(e),
        }
    }

    fn superseded(&self, current: Option<SessionState>, remaining: u64) -> StartOutcome {
        tracing::info!(remaining, "session changed elsewhere, countdown stopped");
        StartOutcome::Superseded { current, remaining }
    }

    /// `begin` followed by `run`
    pub async fn start(
        &self,
        config: &StartConfig,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(u64),
    ) -> Result<StartOutcome> {
        let state = self.begin(config)?;
        self.run(state, config.persist_every, cancel, progress).await
    }

    pub fn pause(&self) -> Result<PauseOutcome> {
        let Some(mut state) = self.store.load()? else {
            return Ok(PauseOutcome::NoSession);
        };
        match state.phase() {
            Phase::Stopped => return Ok(PauseOutcome::NotRunning),
            Phase::Paused => return Ok(PauseOutcome::AlreadyPaused),
            Phase::Running => {}
        }

        state.pause(self.clock.now());
        self.store.save(&state)?;
        tracing::info!(remaining = state.remaining_seconds, "paused");
        Ok(PauseOutcome::Paused(state))
    }

    pub fn resume(&self) -> Result<ResumeOutcome> {
        let Some(mut state) = self.store.load()? else {
            return Ok(ResumeOutcome::NoSession);
        };
        match state.phase() {
            Phase::Stopped => return Ok(ResumeOutcome::NotRunning),
            Phase::Running => return Ok(ResumeOutcome::NotPaused),
            Phase::Paused => {}
        }

        state.resume(self.clock.now());
        self.store.save(&state)?;
        tracing::info!(remaining = state.remaining_seconds, "resumed");
        Ok(ResumeOutcome::Resumed(state))
    }

    /// Report the current phase. A running record whose deadline has passed
    /// is marked stopped and saved before reporting.
    pub fn status(&self) -> Result<Status> {
        let Some(mut state) = self.store.load()? else {
            return Ok(Status::NoSession);
        };
        if !state.running {
            return Ok(Status::Stopped(state));
        }

        let now = self.clock.now();
        if state.is_expired(now) {
            state.halt(0);
            self.store.save(&state)?;
            tracing::info!(ends_at = %state.ends_at, "reconciled finished session");
            return Ok(Status::Finished(state));
        }

        Ok(Status::Active {
            remaining: state.live_remaining(now),
            ends_at: state.effective_end(now),
            state,
        })
    }

    pub fn stop(&self) -> Result<StopOutcome> {
        let Some(mut state) = self.store.load()? else {
            return Ok(StopOutcome::NoSession);
        };
        if state.phase() == Phase::Stopped {
            return Ok(StopOutcome::AlreadyStopped(state));
        }

        let now = self.clock.now();
        let remaining = state.live_remaining(now);
        if state.mode == Mode::Work {
            self.record(CompletedSession::from_state(&state, remaining, now, false));
        }

        state.halt(remaining);
        self.store.save(&state)?;
        tracing::info!(remaining, "stopped");
        Ok(StopOutcome::Stopped(state))
    }

    /// Statistics over work phases that ended in the last `days` days
    pub fn stats(&self, days: u32) -> anyhow::Result<SessionStats> {
        let since = self.clock.now() - Duration::days(i64::from(days));
        let sessions = self.history.since(since)?;
        Ok(SessionStats::from_sessions(&sessions))
    }

    fn record(&self, entry: CompletedSession) {
        if let Err(e) = self.history.record(&entry) {
            tracing::warn!("failed to record history: {e:#}");
        }
    }
}

/// Bridges countdown ticks to the in-memory record and the store
struct Checkpointer<'a, 'p> {
    store: &'a StateStore,
    state: &'a mut SessionState,
    progress: &'a mut (dyn FnMut(u64) + 'p),
}

impl TickHandler for Checkpointer<'_, '_> {
    fn on_tick(&mut self, remaining: u64) {
        self.state.remaining_seconds = remaining;
        (self.progress)(remaining);
    }

    fn on_checkpoint(&mut self, remaining: u64) -> Result<()> {
        self.state.remaining_seconds = remaining;
        let current = self.store.load()?;
        if !owns(&current, self.state) {
            return Err(PomodoroError::Superseded { remaining });
        }
        self.store.save(self.state)
    }
}

/// `current` is still the phase this process is counting down
fn owns(current: &Option<SessionState>, state: &SessionState) -> bool {
    matches!(current, Some(c) if c.same_phase(state))
}
