//! Countdown engine
//!
//! Counts a remaining-seconds value down once per wall-clock second. Each
//! tick is fully handled (tick callback, then an optional checkpoint) before
//! the next wait begins. Cancellation is checked first at every wait.

use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::{PomodoroError, Result};

/// Tick period
pub const TICK: Duration = Duration::from_secs(1);

/// Callbacks driven by the countdown
pub trait TickHandler {
    /// Called after every decrement with the new remaining value
    fn on_tick(&mut self, remaining: u64);

    /// Called every `persist_every` ticks, after `on_tick`. An error stops the
    /// countdown and is returned as-is.
    fn on_checkpoint(&mut self, remaining: u64) -> Result<()>;
}

/// A countdown that ran to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Always 0 for a finished countdown
    pub remaining: u64,
    pub ticks: u64,
}

/// Count `total_seconds` down to zero.
///
/// Returns `Ok` only when the countdown completed. Cancellation yields
/// `PomodoroError::Canceled` carrying the last remaining value; a failed
/// checkpoint yields that checkpoint's error. A `persist_every` of 0 disables
/// checkpoints.
pub async fn run_countdown(
    total_seconds: i64,
    persist_every: u32,
    cancel: &CancellationToken,
    handler: &mut dyn TickHandler,
) -> Result<Countdown> {
    if total_seconds < 0 {
        return Err(PomodoroError::InvalidArgument(format!(
            "total seconds must be >= 0, got {}",
            total_seconds
        )));
    }

    let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut remaining = total_seconds;
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(remaining, ticks, "countdown canceled");
                return Err(PomodoroError::Canceled { remaining: remaining as u64 });
            }
            _ = ticker.tick() => {}
        }

        remaining -= 1;
        if remaining < 0 {
            return Ok(Countdown { remaining: 0, ticks });
        }

        let left = remaining as u64;
        handler.on_tick(left);
        ticks += 1;

        if persist_every > 0 && ticks % u64::from(persist_every) == 0 {
            handler.on_checkpoint(left)?;
            tracing::trace!(remaining = left, ticks, "checkpoint");
        }

        if remaining == 0 {
            return Ok(Countdown { remaining: 0, ticks });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Records every callback; optionally cancels or fails at a given point
    #[derive(Default)]
    struct Recorder {
        ticks: Vec<u64>,
        checkpoints: Vec<(usize, u64)>,
        cancel_at: Option<(u64, CancellationToken)>,
        fail_checkpoint: bool,
    }

    impl TickHandler for Recorder {
        fn on_tick(&mut self, remaining: u64) {
            self.ticks.push(remaining);
            if let Some((at, token)) = &self.cancel_at {
                if remaining == *at {
                    token.cancel();
                }
            }
        }

        fn on_checkpoint(&mut self, remaining: u64) -> Result<()> {
            if self.fail_checkpoint {
                return Err(PomodoroError::Write {
                    path: PathBuf::from("/nowhere/state.json"),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            self.checkpoints.push((self.ticks.len(), remaining));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_zero() {
        for total in [0_i64, 1, 7] {
            let mut rec = Recorder::default();
            let token = CancellationToken::new();

            let done = run_countdown(total, 0, &token, &mut rec).await.unwrap();
            assert_eq!(done.remaining, 0);
            assert_eq!(done.ticks, total as u64);

            let expected: Vec<u64> = (0..total as u64).rev().collect();
            assert_eq!(rec.ticks, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_tick_per_second() {
        let mut rec = Recorder::default();
        let token = CancellationToken::new();
        let start = Instant::now();

        run_countdown(5, 0, &token, &mut rec).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkpoint_cadence() {
        let mut rec = Recorder::default();
        let token = CancellationToken::new();

        run_countdown(10, 3, &token, &mut rec).await.unwrap();
        // Fires after ticks 3, 6 and 9, each after that tick's callback
        assert_eq!(rec.checkpoints, vec![(3, 7), (6, 4), (9, 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let mut rec = Recorder::default();
        let token = CancellationToken::new();
        token.cancel();

        let err = run_countdown(30, 1, &token, &mut rec).await.unwrap_err();
        assert!(matches!(err, PomodoroError::Canceled { remaining: 30 }));
        assert!(rec.ticks.is_empty());
        assert!(rec.checkpoints.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_countdown_stops_ticking() {
        let token = CancellationToken::new();
        let mut rec = Recorder {
            cancel_at: Some((6, token.clone())),
            ..Default::default()
        };

        let err = run_countdown(10, 2, &token, &mut rec).await.unwrap_err();
        assert!(matches!(err, PomodoroError::Canceled { remaining: 6 }));
        assert_eq!(rec.ticks, vec![9, 8, 7, 6]);
        assert_eq!(rec.checkpoints, vec![(2, 8), (4, 6)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_from_another_task() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let mut rec = Recorder::default();
        let err = run_countdown(60, 0, &token, &mut rec).await.unwrap_err();
        assert!(err.is_canceled());
        assert_eq!(rec.ticks, vec![59, 58]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkpoint_failure_stops_immediately() {
        let mut rec = Recorder {
            fail_checkpoint: true,
            ..Default::default()
        };
        let token = CancellationToken::new();

        let err = run_countdown(10, 2, &token, &mut rec).await.unwrap_err();
        assert!(matches!(err, PomodoroError::Write { .. }));
        assert_eq!(rec.ticks, vec![9, 8]);
    }

    #[tokio::test]
    async fn test_negative_total_rejected() {
        let mut rec = Recorder::default();
        let token = CancellationToken::new();

        let err = run_countdown(-1, 1, &token, &mut rec).await.unwrap_err();
        assert!(matches!(err, PomodoroError::InvalidArgument(_)));
        assert!(rec.ticks.is_empty());
    }
}
