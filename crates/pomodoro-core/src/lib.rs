//! pomodoro-core - Shared functionality for the pomodoro tools
//!
//! Path resolution, the user configuration file and display formatting.

pub mod config;
pub mod format;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
