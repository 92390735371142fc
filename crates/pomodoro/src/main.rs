//! pomodoro - Work/break countdown with state shared across invocations
//!
//! Usage:
//!   pomodoro start [--work N] [--break N] [--long-break N] [--sessions N] [--task S] [--force]
//!   pomodoro pause              Freeze the running phase
//!   pomodoro resume             Continue a paused phase
//!   pomodoro status [--json]    Show the current phase
//!   pomodoro stop               Stop the session
//!   pomodoro stats [DAYS]       Summarize finished work phases

use anyhow::Result;
use clap::{Parser, Subcommand};
use pomodoro_core::{format, Config, Paths};
use pomodoro_notify::{DesktopNotifier, Notifier, SilentNotifier};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pomodoro::{
    History, PauseOutcome, ResumeOutcome, SessionController, SessionState, StartConfig,
    StartOutcome, StateStore, Status, StopOutcome, SystemClock,
};

/// Pomodoro - work/break countdown with desktop notifications
#[derive(Parser)]
#[command(name = "pomodoro")]
#[command(about = "Pomodoro timer with pause/resume across terminals")]
#[command(version)]
#[command(after_help = r#"STATE:
    Session state lives in $XDG_STATE_HOME/pomodoro/state.json
    (or ~/.pomodoro/state.json). Defaults come from config.json in
    the user config directory, or $POMODORO_CONFIG.

EXAMPLES:
    pomodoro start                      # 25-minute work phase
    pomodoro start --work 50 --task API # Custom length with a task label
    pomodoro pause                      # From another terminal
    pomodoro resume
    pomodoro status --json              # For status bars
    pomodoro stats 30                   # Last 30 days

LOGGING:
    RUST_LOG=pomodoro=debug pomodoro start
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a work phase and count it down
    #[command(alias = "s")]
    Start {
        /// Work duration in minutes
        #[arg(long = "work", value_name = "MINS")]
        work_minutes: Option<u32>,

        /// Break duration in minutes
        #[arg(long = "break", value_name = "MINS")]
        break_minutes: Option<u32>,

        /// Long break duration in minutes
        #[arg(long = "long-break", value_name = "MINS")]
        long_break_minutes: Option<u32>,

        /// Work sessions per cycle before a long break
        #[arg(long)]
        sessions: Option<u32>,

        /// What you're working on
        #[arg(long)]
        task: Option<String>,

        /// Replace a session that is already running
        #[arg(long)]
        force: bool,

        /// Save remaining time every N seconds
        #[arg(long, value_name = "SECS")]
        persist_every: Option<u32>,

        /// Don't send a desktop notification on completion
        #[arg(long)]
        quiet: bool,
    },

    /// Pause the running phase
    #[command(alias = "p")]
    Pause,

    /// Resume a paused phase
    #[command(alias = "r")]
    Resume,

    /// Show current status
    #[command(alias = "st")]
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stop the current session
    #[command(alias = "end")]
    Stop,

    /// Show work-phase statistics
    Stats {
        /// Number of days to include
        #[arg(default_value = "7")]
        days: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

// ANSI color codes
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[0;33m";
const CYAN: &str = "\x1b[0;36m";
const RED: &str = "\x1b[0;31m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let config = Config::load(&paths.config_file)?;
    let notifier: Box<dyn Notifier> = match &cli.command {
        Some(Commands::Start { quiet: true, .. }) => Box::new(SilentNotifier),
        _ => Box::new(DesktopNotifier::detect()),
    };
    let controller = SessionController::new(
        StateStore::new(&paths),
        History::new(&paths),
        Box::new(SystemClock),
        notifier,
    );

    match cli.command {
        Some(Commands::Start {
            work_minutes,
            break_minutes,
            long_break_minutes,
            sessions,
            task,
            force,
            persist_every,
            quiet: _,
        }) => {
            let mut start = StartConfig::from_config(&config);
            if let Some(m) = work_minutes {
                start.work_seconds = u64::from(m) * 60;
            }
            if let Some(m) = break_minutes {
                start.break_seconds = u64::from(m) * 60;
            }
            if let Some(m) = long_break_minutes {
                start.long_break_seconds = u64::from(m) * 60;
            }
            if let Some(n) = sessions {
                start.sessions_total = n;
            }
            if let Some(n) = persist_every {
                start.persist_every = n;
            }
            start.task = task;
            start.force = force;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cmd_start(&controller, start))
        }
        Some(Commands::Pause) => cmd_pause(&controller),
        Some(Commands::Resume) => cmd_resume(&controller),
        Some(Commands::Status { json }) => cmd_status(&controller, json),
        Some(Commands::Stop) => cmd_stop(&controller),
        Some(Commands::Stats { days, json }) => cmd_stats(&controller, days, json),
        None => cmd_status(&controller, false),
    }
}

/// Start a work phase and block until it finishes or Ctrl-C
async fn cmd_start(controller: &SessionController, start: StartConfig) -> Result<()> {
    let state = controller.begin(&start)?;

    match &state.task {
        Some(task) => println!("🍅 Pomodoro started (Task: {})", task),
        None => println!("🍅 Pomodoro started"),
    }
    println!(
        "  {}  {}   {} {}",
        color(CYAN, "Work:"),
        format::mmss(state.work_seconds),
        color(CYAN, "Ends at:"),
        format::clock_time(state.ends_at)
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut progress = |remaining: u64| println!("⏳ Remaining: {}", format::mmss(remaining));
    let outcome = controller
        .run(state, start.persist_every, &cancel, &mut progress)
        .await?;

    match outcome {
        StartOutcome::Completed { state, next } => {
            println!(
                "{} Pomodoro finished! {} time.",
                color(GREEN, "✅"),
                next.label()
            );
            println!(
                "  {} {} (session {}/{})",
                color(CYAN, "Next:"),
                format::mmss(state.remaining_seconds),
                state.session_index,
                state.sessions_total
            );
        }
        StartOutcome::Canceled { state } => {
            println!();
            println!("{} Pomodoro canceled.", color(RED, "⛔️"));
            println!(
                "  {} {}",
                color(CYAN, "Remaining:"),
                format::mmss(state.remaining_seconds)
            );
        }
        StartOutcome::Superseded { current, .. } => {
            println!();
            println!("Session changed by another invocation; countdown stopped.");
            if let Some(state) = current.filter(|s| s.paused) {
                println!(
                    "  {} {}",
                    color(CYAN, "Paused with:"),
                    format::mmss(state.remaining_seconds)
                );
                println!("Hint: pomodoro resume");
            }
        }
    }

    Ok(())
}

fn cmd_pause(controller: &SessionController) -> Result<()> {
    match controller.pause()? {
        PauseOutcome::NoSession => println!("No active session to pause."),
        PauseOutcome::NotRunning => {
            println!("🛑 No running session.");
            println!("Hint: pomodoro start");
        }
        PauseOutcome::AlreadyPaused => println!("Session already paused."),
        PauseOutcome::Paused(state) => {
            println!("{} Pomodoro paused.", color(YELLOW, "⏸️"));
            println!("Remaining: {}", format::mmss(state.remaining_seconds));
        }
    }
    Ok(())
}

fn cmd_resume(controller: &SessionController) -> Result<()> {
    match controller.resume()? {
        ResumeOutcome::NoSession => println!("No session found."),
        ResumeOutcome::NotRunning => {
            println!("🛑 No running session to resume.");
            println!("Hint: pomodoro start");
        }
        ResumeOutcome::NotPaused => println!("Session is not paused."),
        ResumeOutcome::Resumed(state) => {
            println!("{} Pomodoro resumed.", color(GREEN, "▶️"));
            println!("Remaining: {}", format::mmss(state.remaining_seconds));
            println!("Ends at: {}", format::clock_time(state.ends_at));
        }
    }
    Ok(())
}

/// JSON shape of `status --json`
#[derive(Serialize)]
struct StatusPayload<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ends_at: Option<String>,
}

impl StatusPayload<'_> {
    fn stopped(message: &'static str) -> Self {
        Self {
            status: "stopped",
            message: Some(message),
            mode: None,
            remaining_seconds: None,
            task: None,
            session: None,
            ends_at: None,
        }
    }
}

fn session_label(state: &SessionState) -> String {
    format!("{}/{}", state.session_index, state.sessions_total)
}

fn status_payload(status: &Status) -> StatusPayload<'_> {
    match status {
        Status::NoSession => StatusPayload::stopped("No active session. Run: pomodoro start"),
        Status::Stopped(_) => StatusPayload::stopped("No active session."),
        Status::Finished(_) => StatusPayload::stopped("Session already finished."),
        Status::Active {
            state,
            remaining,
            ends_at,
        } => StatusPayload {
            status: if state.paused { "paused" } else { "running" },
            message: None,
            mode: Some(state.mode.as_str()),
            remaining_seconds: Some(*remaining),
            task: state.task.as_deref(),
            session: Some(session_label(state)),
            ends_at: Some(ends_at.to_rfc3339()),
        },
    }
}

fn cmd_status(controller: &SessionController, json: bool) -> Result<()> {
    let status = controller.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status_payload(&status))?);
        return Ok(());
    }

    match status {
        Status::NoSession => println!("No active session. Run: pomodoro start"),
        Status::Stopped(_) => {
            println!("🛑 Status: STOPPED");
            println!("No active session.");
            println!("Hint: pomodoro start");
        }
        Status::Finished(_) => println!("Session already finished."),
        Status::Active {
            state,
            remaining,
            ends_at,
        } => {
            if state.paused {
                println!("{}", color(&format!("{}{}", BOLD, YELLOW), "⏸️ Status: PAUSED"));
            } else {
                println!("{}", color(&format!("{}{}", BOLD, RED), "🍅 Status: RUNNING"));
            }
            println!(
                "  {}      {} (session {})",
                color(CYAN, "Mode:"),
                state.mode,
                session_label(&state)
            );
            if let Some(task) = &state.task {
                println!("  {}      {}", color(CYAN, "Task:"), task);
            }
            println!("  {} {}", color(CYAN, "Remaining:"), format::mmss(remaining));
            println!("  {}   {}", color(CYAN, "Ends at:"), format::clock_time(ends_at));
            if state.paused {
                println!("Hint: pomodoro resume");
            }
        }
    }
    Ok(())
}

fn cmd_stop(controller: &SessionController) -> Result<()> {
    match controller.stop()? {
        StopOutcome::NoSession => println!("No active session."),
        StopOutcome::AlreadyStopped(_) => println!("Session already stopped."),
        StopOutcome::Stopped(state) => {
            println!("{} Pomodoro stopped.", color(GREEN, "[ok]"));
            println!(
                "  {} {} ({} remaining)",
                color(CYAN, "Mode:"),
                state.mode,
                format::mmss(state.remaining_seconds)
            );
        }
    }
    Ok(())
}

fn cmd_stats(controller: &SessionController, days: u32, json: bool) -> Result<()> {
    let stats = controller.stats(days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let (hours, mins) = stats.total_time();
    println!("{}Pomodoro Statistics (Last {} days){}", BOLD, days, NC);
    println!();
    println!("  {}    {}", color(CYAN, "Total Sessions:"), stats.total_sessions);
    println!(
        "  {}         {} ({}%)",
        color(CYAN, "Completed:"),
        stats.completed_sessions,
        stats.completion_rate
    );
    println!("  {}  {}h {}m", color(CYAN, "Total Focus Time:"), hours, mins);
    if stats.total_sessions > 0 {
        println!(
            "  {}   {}",
            color(CYAN, "Average Session:"),
            format::duration(stats.average_focus_seconds)
        );
    }
    Ok(())
}
