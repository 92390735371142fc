//! Standard paths used by the pomodoro tools
//!
//! - State:   $XDG_STATE_HOME/pomodoro/state.json, else ~/.pomodoro/state.json
//! - History: alongside the state file, history.jsonl
//! - Config:  $POMODORO_CONFIG, else <config dir>/pomodoro/config.json

use std::path::{Path, PathBuf};

/// Environment variable selecting the state directory root
pub const STATE_HOME_ENV: &str = "XDG_STATE_HOME";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "POMODORO_CONFIG";

const APP_DIR: &str = "pomodoro";
const HOME_DIR: &str = ".pomodoro";
const STATE_FILE: &str = "state.json";
const HISTORY_FILE: &str = "history.jsonl";
const CONFIG_FILE: &str = "config.json";

/// Standard pomodoro paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Directory holding the state file and history log
    pub state_dir: PathBuf,
    /// Path of the user config file
    pub config_file: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    /// Resolve paths from the process environment
    pub fn new() -> Self {
        Self::resolve(
            std::env::var_os(STATE_HOME_ENV).map(PathBuf::from),
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            dirs::home_dir(),
            dirs::config_dir(),
        )
    }

    /// Resolve paths from explicit inputs. No filesystem access.
    pub fn resolve(
        state_home: Option<PathBuf>,
        config_override: Option<PathBuf>,
        home: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let home = home.unwrap_or_else(|| PathBuf::from("~"));

        let state_dir = match state_home.filter(|p| !p.as_os_str().is_empty()) {
            Some(xdg) => xdg.join(APP_DIR),
            None => home.join(HOME_DIR),
        };

        let config_file = match config_override.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => path,
            None => config_dir
                .unwrap_or_else(|| home.join(".config"))
                .join(APP_DIR)
                .join(CONFIG_FILE),
        };

        Self {
            state_dir,
            config_file,
        }
    }

    /// State and config rooted at a single directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            state_dir: dir.to_path_buf(),
            config_file: dir.join(CONFIG_FILE),
        }
    }

    /// Path of the persisted session state
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }

    /// Path of the completed-session log
    pub fn history_file(&self) -> PathBuf {
        self.state_dir.join(HISTORY_FILE)
    }
}
