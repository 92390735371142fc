//! pomodoro-notify - Desktop notifications for phase changes
//!
//! Works on macOS (terminal-notifier/osascript), Linux (notify-send/kdialog)
//! and WSL. Delivery is best-effort: failures are logged, never returned.

mod backend;

use backend::{Backend, Notification};

/// Something that can tell the user a phase finished
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Notifier backed by the platform's desktop notification tool
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier {
    backend: Backend,
}

impl DesktopNotifier {
    /// Use the best backend available on this machine
    pub fn detect() -> Self {
        Self {
            backend: Backend::detect(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::detect()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let notification = Notification::new(title, message);
        if let Err(e) = self.backend.send(&notification) {
            tracing::warn!(backend = self.backend.name(), "notification failed: {e:#}");
        }
    }
}

/// Notifier that drops everything (`--quiet`, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::debug!(title, message, "notification suppressed");
    }
}
