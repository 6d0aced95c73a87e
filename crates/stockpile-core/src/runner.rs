//! Round loop runner with stop controls.
//!
//! This module provides [`run_round`], the async function that drives one
//! round's tick loop:
//!
//! - **Fixed period**: one tick per configured interval, the first one a
//!   full period after the round starts
//! - **Natural end**: returns once the round clock expires
//! - **Supersession**: a restart stops the old loop, and any tick that still
//!   reaches the state under an old session id is discarded
//! - **Shutdown**: the host can stop the loop between ticks
//!
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use stockpile_types::SessionId;
use tokio::sync::{Mutex, Notify};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::MAX_TICK_INTERVAL_MS;
use crate::demand::{DemandSource, NegativeDemand};
use crate::game::GameState;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during a round.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Reason a round's tick loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEndReason {
    /// The round clock reached zero.
    TimerExpired,
    /// A new round was started over this one.
    Superseded,
    /// The host shut the session down.
    Shutdown,
}

/// Shared stop control for one round's tick loop.
///
/// Held in an [`Arc`](std::sync::Arc) by both the session and the loop.
#[derive(Debug)]
pub struct RoundControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the loop when a stop is requested.
    stop_notify: Notify,

    /// Why the stop was requested.
    stop_reason: Mutex<Option<RoundEndReason>>,

    /// Why the loop actually ended, once it has.
    end_reason: Mutex<Option<RoundEndReason>>,

    /// Real time between ticks.
    tick_interval: Duration,
}

impl RoundControl {
    /// Create a control for a loop ticking every `tick_interval`.
    ///
    /// Periods longer than [`MAX_TICK_INTERVAL_MS`] are clamped to it.
    pub fn new(tick_interval: Duration) -> Self {
        let tick_interval = tick_interval.min(Duration::from_millis(MAX_TICK_INTERVAL_MS));
        Self {
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            stop_reason: Mutex::new(None),
            end_reason: Mutex::new(None),
            tick_interval,
        }
    }

    /// Real time between ticks.
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Ask the loop to stop before its next tick.
    ///
    /// The first reason recorded wins.
    pub async fn request_stop(&self, reason: RoundEndReason) {
        {
            let mut guard = self.stop_reason.lock().await;
            if guard.is_none() {
                *guard = Some(reason);
            }
        }
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop has been requested.
    pub async fn stopped(&self) {
        while !self.stop_requested.load(Ordering::Acquire) {
            self.stop_notify.notified().await;
        }
    }

    /// Record the reason the loop ended.
    pub async fn set_end_reason(&self, reason: RoundEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the loop ended, if it has.
    pub async fn end_reason(&self) -> Option<RoundEndReason> {
        *self.end_reason.lock().await
    }

    async fn requested_reason(&self) -> RoundEndReason {
        self.stop_reason
            .lock()
            .await
            .unwrap_or(RoundEndReason::Shutdown)
    }
}

/// Result of one round's tick loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    /// The round the loop drove.
    pub session_id: SessionId,
    /// The reason the loop ended.
    pub end_reason: RoundEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to publish snapshots. The callback runs
/// while the state lock is held, so it sees exactly the state the tick
/// produced.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &GameState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &GameState) {}
}

/// Run one round's tick loop until the clock expires or a stop is requested.
///
/// Each period the loop takes the state lock, checks that the state still
/// belongs to `session_id` and is playing, runs one tick, and hands the
/// summary to `callback` before releasing the lock.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub async fn run_round(
    state: &Mutex<GameState>,
    session_id: SessionId,
    source: &mut dyn DemandSource,
    policy: NegativeDemand,
    control: &RoundControl,
    callback: &mut dyn TickCallback,
) -> Result<RoundResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    let period = control.tick_interval();
    let first = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut interval = tokio::time::interval_at(first, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        %session_id,
        tick_interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        "Round loop starting"
    );

    loop {
        // --- Check stop request (before waiting) ---
        if control.is_stop_requested() {
            let reason = control.requested_reason().await;
            return Ok(finish(control, session_id, reason, last_summary, total_ticks).await);
        }

        tokio::select! {
            () = control.stopped() => continue,
            _ = interval.tick() => {}
        }

        // --- Check stop request (a restart may have raced the timer) ---
        if control.is_stop_requested() {
            continue;
        }

        let mut guard = state.lock().await;

        // --- Stale-tick fence ---
        if !guard.is_playing_session(session_id) {
            warn!(
                %session_id,
                current = ?guard.session_id(),
                phase = ?guard.phase(),
                "Discarding tick for a round that is no longer playing"
            );
            drop(guard);
            return Ok(finish(
                control,
                session_id,
                RoundEndReason::Superseded,
                last_summary,
                total_ticks,
            )
            .await);
        }

        // --- Execute tick ---
        let summary = tick::run_tick(&mut guard, source, policy)?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, &guard);
        drop(guard);

        if summary.round_over {
            debug!(%session_id, total_ticks, "Round clock expired");
            return Ok(finish(
                control,
                session_id,
                RoundEndReason::TimerExpired,
                Some(summary),
                total_ticks,
            )
            .await);
        }

        last_summary = Some(summary);
    }
}

async fn finish(
    control: &RoundControl,
    session_id: SessionId,
    end_reason: RoundEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> RoundResult {
    control.set_end_reason(end_reason).await;
    RoundResult {
        session_id,
        end_reason,
        final_summary,
        total_ticks,
    }
}

/// Log the end of a round.
pub fn log_round_end(result: &RoundResult) {
    info!(
        session_id = %result.session_id,
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "Round loop ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            day = summary.day,
            time_remaining = summary.time_remaining,
            score = summary.score,
            stock_accuracy = summary.stock_accuracy,
            "Final tick summary"
        );
    } else {
        warn!("Round ended with no ticks executed");
    }
}
