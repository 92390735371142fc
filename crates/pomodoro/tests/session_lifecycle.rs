//! Cross-invocation behavior: each `invocation()` is a fresh controller over
//! the same state file, the way separate CLI processes see it.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pomodoro::{
    History, ManualClock, Mode, PauseOutcome, ResumeOutcome, SessionController, StartConfig,
    StartOutcome, StateStore, Status,
};
use pomodoro_core::{Config, Paths};
use pomodoro_notify::SilentNotifier;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 14, 0, 0).unwrap()
}

fn invocation(paths: &Paths, clock: &Arc<ManualClock>) -> SessionController {
    SessionController::new(
        StateStore::new(paths),
        History::new(paths),
        Box::new(clock.clone()),
        Box::new(SilentNotifier),
    )
}

fn one_minute_work() -> StartConfig {
    StartConfig {
        work_seconds: 60,
        sessions_total: 4,
        ..StartConfig::from_config(&Config::default())
    }
}

#[tokio::test(start_paused = true)]
async fn one_minute_work_session_stages_a_break() {
    let dir = TempDir::new().unwrap();
    let paths = Paths::in_dir(dir.path());
    let clock = Arc::new(ManualClock::new(t0()));

    let token = CancellationToken::new();
    let outcome = invocation(&paths, &clock)
        .start(&one_minute_work(), &token, &mut |_| {})
        .await
        .unwrap();
    assert!(matches!(outcome, StartOutcome::Completed { next: Mode::Break, .. }));

    let saved = StateStore::new(&paths).load().unwrap().unwrap();
    assert_eq!(saved.mode, Mode::Break);
    assert!(!saved.running);
    assert_eq!(saved.remaining_seconds, saved.break_seconds);
    assert_eq!(saved.break_seconds, 300);

    let raw = std::fs::read_to_string(paths.state_file()).unwrap();
    assert!(raw.contains("\"mode\": \"break\""));
    assert!(raw.contains("\"paused_at\": null"));
}

#[test]
fn pause_and_resume_from_other_invocations() {
    let dir = TempDir::new().unwrap();
    let paths = Paths::in_dir(dir.path());
    let clock = Arc::new(ManualClock::new(t0()));

    invocation(&paths, &clock).begin(&one_minute_work()).unwrap();
    clock.advance(20);

    let PauseOutcome::Paused(paused) = invocation(&paths, &clock).pause().unwrap() else {
        panic!("expected pause");
    };
    assert_eq!(paused.remaining_seconds, 40);

    // Time spent paused does not count
    clock.advance(3600);
    let Status::Active { remaining, .. } = invocation(&paths, &clock).status().unwrap() else {
        panic!("expected active");
    };
    assert_eq!(remaining, 40);

    let ResumeOutcome::Resumed(resumed) = invocation(&paths, &clock).resume().unwrap() else {
        panic!("expected resume");
    };
    assert_eq!(resumed.ends_at, clock_now(&clock) + Duration::seconds(40));

    clock.advance(41);
    assert!(matches!(
        invocation(&paths, &clock).status().unwrap(),
        Status::Finished(_)
    ));
    let saved = StateStore::new(&paths).load().unwrap().unwrap();
    assert!(!saved.running);
}

#[test]
fn start_refuses_while_another_invocation_runs() {
    let dir = TempDir::new().unwrap();
    let paths = Paths::in_dir(dir.path());
    let clock = Arc::new(ManualClock::new(t0()));

    invocation(&paths, &clock).begin(&one_minute_work()).unwrap();
    let err = invocation(&paths, &clock).begin(&one_minute_work()).unwrap_err();
    assert!(matches!(err, pomodoro::PomodoroError::AlreadyRunning));

    let forced = StartConfig {
        force: true,
        task: Some("override".into()),
        ..one_minute_work()
    };
    invocation(&paths, &clock).begin(&forced).unwrap();
    let saved = StateStore::new(&paths).load().unwrap().unwrap();
    assert_eq!(saved.task.as_deref(), Some("override"));
}

#[test]
fn corrupt_state_surfaces_parse_error() {
    let dir = TempDir::new().unwrap();
    let paths = Paths::in_dir(dir.path());
    let clock = Arc::new(ManualClock::new(t0()));
    std::fs::write(paths.state_file(), "garbage").unwrap();

    let err = invocation(&paths, &clock).status().unwrap_err();
    assert!(matches!(err, pomodoro::PomodoroError::Parse { .. }));
}

fn clock_now(clock: &Arc<ManualClock>) -> DateTime<Utc> {
    use pomodoro::Clock;
    clock.now()
}
