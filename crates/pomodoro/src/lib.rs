//! pomodoro - Work/break countdown with state shared across invocations
//!
//! `start` drives a one-second countdown and checkpoints the remaining time
//! to a single state file. Later invocations (`pause`, `resume`, `status`,
//! `stop`) read and mutate that same file.
//!
//! Commands:
//! - start: Begin a work phase and count it down
//! - pause / resume: Freeze and unfreeze the current phase
//! - status [--json]: Show the current phase and remaining time
//! - stop: Mark the session stopped
//! - stats [DAYS]: Summarize completed work phases

pub mod clock;
pub mod error;
pub mod history;
pub mod session;
pub mod state;
pub mod stats;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PomodoroError, Result};
pub use history::{CompletedSession, History};
pub use session::{
    PauseOutcome, ResumeOutcome, SessionController, StartConfig, StartOutcome, Status, StopOutcome,
};
pub use state::{Mode, SessionState, STATE_VERSION};
pub use stats::SessionStats;
pub use store::StateStore;
pub use timer::{run_countdown, Countdown, TickHandler, TICK};
