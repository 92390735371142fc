//! Notification backends for different platforms

use anyhow::{bail, Result};
use std::process::Command;

/// A notification to display; every backend that can plays a sound
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Available notification backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS terminal-notifier
    TerminalNotifier,
    /// macOS osascript
    Osascript,
    /// Linux notify-send
    NotifySend,
    /// KDE kdialog
    Kdialog,
    /// WSL PowerShell toast
    Wsl,
    /// Fallback: print to the terminal
    Echo,
}

impl Backend {
    /// Detect the best available backend for the current platform
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            if Self::command_exists("terminal-notifier") {
                return Self::TerminalNotifier;
            }
            return Self::Osascript;
        }

        #[cfg(target_os = "linux")]
        {
            if std::env::var("WSL_DISTRO_NAME").is_ok() {
                return Self::Wsl;
            }
            if Self::command_exists("notify-send") {
                return Self::NotifySend;
            }
            if Self::command_exists("kdialog") {
                return Self::Kdialog;
            }
            return Self::Echo;
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            Self::Echo
        }
    }

    #[allow(dead_code)]
    fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TerminalNotifier => "terminal-notifier",
            Self::Osascript => "osascript",
            Self::NotifySend => "notify-send",
            Self::Kdialog => "kdialog",
            Self::Wsl => "wsl",
            Self::Echo => "echo",
        }
    }

    /// Send a notification using this backend
    pub fn send(&self, notification: &Notification) -> Result<()> {
        match self {
            Self::TerminalNotifier => send_terminal_notifier(notification),
            Self::Osascript => send_osascript(notification),
            Self::NotifySend => send_notify_send(notification),
            Self::Kdialog => send_kdialog(notification),
            Self::Wsl => send_wsl(notification),
            Self::Echo => {
                println!("{}", echo_line(notification));
                Ok(())
            }
        }
    }
}

fn run(mut cmd: Command, name: &str) -> Result<()> {
    let output = cmd.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} failed with status {}: {}", name, output.status, stderr.trim());
    }
    Ok(())
}

fn send_terminal_notifier(notification: &Notification) -> Result<()> {
    let mut cmd = Command::new("terminal-notifier");
    cmd.args([
        "-title",
        &notification.title,
        "-message",
        &notification.message,
        "-group",
        "pomodoro",
        "-sound",
        "default",
    ]);
    run(cmd, "terminal-notifier")
}

fn send_osascript(notification: &Notification) -> Result<()> {
    let mut cmd = Command::new("osascript");
    cmd.args(["-e", &osascript_source(notification)]);
    run(cmd, "osascript")
}

fn send_notify_send(notification: &Notification) -> Result<()> {
    let mut cmd = Command::new("notify-send");
    cmd.args([&notification.title, &notification.message]);
    run(cmd, "notify-send")
}

fn send_kdialog(notification: &Notification) -> Result<()> {
    let mut cmd = Command::new("kdialog");
    cmd.args([
        "--passivepopup",
        &notification.message,
        "5",
        "--title",
        &notification.title,
    ]);
    run(cmd, "kdialog")
}

fn send_wsl(notification: &Notification) -> Result<()> {
    let title = notification.title.replace('\'', "''");
    let message = notification.message.replace('\'', "''");

    let ps_script = format!(
        r#"[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null; $template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); $template.GetElementsByTagName('text')[0].AppendChild($template.CreateTextNode('{}')) | Out-Null; $template.GetElementsByTagName('text')[1].AppendChild($template.CreateTextNode('{}')) | Out-Null; [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('Pomodoro').Show([Windows.UI.Notifications.ToastNotification]::new($template))"#,
        title, message
    );

    let status = Command::new("powershell.exe")
        .args(["-Command", &ps_script])
        .status()?;

    // PowerShell interop is flaky under WSL; fall back to the terminal
    if !status.success() {
        println!("{}", echo_line(notification));
    }
    Ok(())
}

/// AppleScript source for `display notification`, quotes escaped
fn osascript_source(notification: &Notification) -> String {
    let title = escape_applescript(&notification.title);
    let message = escape_applescript(&notification.message);

    format!(
        r#"display notification "{}" with title "{}" sound name "default""#,
        message, title
    )
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', r#"\""#)
}

fn echo_line(notification: &Notification) -> String {
    format!("\x07[{}] {}", notification.title, notification.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osascript_escapes_quotes() {
        let n = Notification::new("Say \"hi\"", r"C:\tmp");
        assert_eq!(
            osascript_source(&n),
            r#"display notification "C:\\tmp" with title "Say \"hi\"" sound name "default""#
        );
    }

    #[test]
    fn test_echo_line_rings_bell() {
        let n = Notification::new("Pomodoro finished!", "Break time.");
        assert_eq!(echo_line(&n), "\x07[Pomodoro finished!] Break time.");
    }

    #[test]
    fn test_echo_backend_never_fails() {
        let n = Notification::new("Pomodoro", "test");
        assert!(Backend::Echo.send(&n).is_ok());
        assert_eq!(Backend::Echo.name(), "echo");
    }
}
