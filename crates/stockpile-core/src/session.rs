//! Game session: the runtime host for one player's game.
//!
//! [`GameSession`] owns the [`GameState`] behind an async mutex, drives the
//! tick loop for the current round on a spawned task, and publishes a fresh
//! [`GameSnapshot`] after every mutation. Each snapshot lands in a `watch`
//! channel (latest value, for [`GameSession::snapshot`] and
//! [`GameSession::subscribe`]) and on a `broadcast` feed that carries every
//! snapshot in publication order ([`GameSession::subscribe_feed`]).
//!
//! Only one round's loop runs at a time. [`GameSession::start`] stops and
//! joins the previous loop before resetting the state, and the loop itself
//! fences every tick on its session id, so a superseded timer can never
//! touch a freshly reset game.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use stockpile_types::{Category, GameSnapshot, SessionId};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::demand::{DemandSource, NegativeDemand, RandomDemand};
use crate::game::{Adjustment, GameState};
use crate::runner::{
    self, RoundControl, RoundEndReason, RoundResult, RunnerError, TickCallback,
};
use crate::tick::TickSummary;

/// Builds the demand source for a round, given the round's index.
pub type DemandFactory = Box<dyn Fn(u64) -> Box<dyn DemandSource> + Send + Sync>;

/// Errors surfaced when joining a round's tick loop.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The loop failed while ticking.
    #[error("round loop failed: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: RunnerError,
    },

    /// The loop task panicked or was cancelled.
    #[error("round task did not complete: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: JoinError,
    },
}

/// Capacity of the snapshot feed.
///
/// A feed subscriber that falls more than this many snapshots behind
/// receives [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const FEED_CAPACITY: usize = 256;

/// Both ends a snapshot is published to.
#[derive(Debug)]
pub struct SnapshotChannels {
    latest: watch::Sender<GameSnapshot>,
    feed: broadcast::Sender<GameSnapshot>,
}

impl SnapshotChannels {
    /// Create the channels holding `initial` as the latest snapshot.
    pub fn new(initial: GameSnapshot) -> Self {
        let (latest, _) = watch::channel(initial);
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self { latest, feed }
    }

    /// Publish `snapshot` to the feed and make it the latest value.
    ///
    /// Returns the number of feed subscribers that received it; zero
    /// subscribers is not an error.
    pub fn publish(&self, snapshot: GameSnapshot) -> usize {
        let delivered = self.feed.send(snapshot.clone()).unwrap_or(0);
        self.latest.send_replace(snapshot);
        delivered
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> GameSnapshot {
        self.latest.borrow().clone()
    }

    /// Subscribe to the latest value.
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.latest.subscribe()
    }

    /// Subscribe to every snapshot published from now on.
    pub fn subscribe_feed(&self) -> broadcast::Receiver<GameSnapshot> {
        self.feed.subscribe()
    }
}

/// Tick callback that republishes the snapshot after every tick.
pub struct SnapshotPublisher {
    channels: Arc<SnapshotChannels>,
}

impl SnapshotPublisher {
    /// Create a publisher writing to `channels`.
    pub const fn new(channels: Arc<SnapshotChannels>) -> Self {
        Self { channels }
    }
}

impl TickCallback for SnapshotPublisher {
    fn on_tick(&mut self, summary: &TickSummary, state: &GameState) {
        let delivered = self.channels.publish(state.snapshot());
        debug!(day = summary.day, delivered, "Snapshot published");
    }
}

struct ActiveRound {
    session_id: SessionId,
    control: Arc<RoundControl>,
    handle: JoinHandle<Result<RoundResult, RunnerError>>,
}

/// Runtime host for the game.
///
/// Cheap to share behind an [`Arc`]; every method takes `&self`.
pub struct GameSession {
    state: Arc<Mutex<GameState>>,
    snapshots: Arc<SnapshotChannels>,
    round: Mutex<Option<ActiveRound>>,
    demand: DemandFactory,
    policy: NegativeDemand,
    tick_interval: Duration,
    rounds_started: AtomicU64,
}

impl GameSession {
    /// Create a session on the intro screen.
    ///
    /// Demand is random: seeded per round from `demand.seed` when set,
    /// otherwise from the operating system.
    pub fn new(config: &GameConfig) -> Self {
        let seed = config.demand.seed;
        let factory: DemandFactory = Box::new(move |round| -> Box<dyn DemandSource> {
            match seed {
                Some(seed) => Box::new(RandomDemand::from_seed(seed.wrapping_add(round))),
                None => Box::new(RandomDemand::from_entropy()),
            }
        });
        Self::with_demand(config, factory)
    }

    /// Create a session that draws each round's demand from `factory`.
    pub fn with_demand(config: &GameConfig, factory: DemandFactory) -> Self {
        let state = GameState::new();
        let snapshots = SnapshotChannels::new(state.snapshot());
        Self {
            state: Arc::new(Mutex::new(state)),
            snapshots: Arc::new(snapshots),
            round: Mutex::new(None),
            demand: factory,
            policy: config.demand.negative_demand,
            tick_interval: config.clock.tick_interval(),
            rounds_started: AtomicU64::new(0),
        }
    }

    /// Start a new round, discarding any round in progress.
    ///
    /// Returns the new round's session id.
    pub async fn start(&self) -> SessionId {
        let mut round = self.round.lock().await;

        if let Some(previous) = round.take() {
            Self::stop_round(previous, RoundEndReason::Superseded).await;
        }

        let session_id = SessionId::new();
        {
            let mut state = self.state.lock().await;
            state.start(session_id);
            self.snapshots.publish(state.snapshot());
        }

        let index = self.rounds_started.fetch_add(1, Ordering::AcqRel);
        let mut source = (self.demand)(index);
        let control = Arc::new(RoundControl::new(self.tick_interval));
        let mut publisher = SnapshotPublisher::new(Arc::clone(&self.snapshots));
        let policy = self.policy;

        let handle = {
            let state = Arc::clone(&self.state);
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                let result = runner::run_round(
                    &state,
                    session_id,
                    source.as_mut(),
                    policy,
                    &control,
                    &mut publisher,
                )
                .await;
                if let Ok(ref finished) = result {
                    runner::log_round_end(finished);
                }
                result
            })
        };

        info!(%session_id, round = index, "Round loop spawned");
        *round = Some(ActiveRound {
            session_id,
            control,
            handle,
        });
        session_id
    }

    /// Adjust `category`'s stock by `amount`.
    ///
    /// Returns `None` (and publishes nothing) unless a round is playing.
    pub async fn adjust(&self, category: Category, amount: i32) -> Option<Adjustment> {
        let mut state = self.state.lock().await;
        let adjustment = state.adjust_stock(category, amount)?;
        self.snapshots.publish(state.snapshot());
        Some(adjustment)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.latest()
    }

    /// Subscribe to the latest snapshot.
    ///
    /// A slow receiver only ever sees the newest value.
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.subscribe()
    }

    /// Subscribe to every snapshot published from now on, in order.
    pub fn subscribe_feed(&self) -> broadcast::Receiver<GameSnapshot> {
        self.snapshots.subscribe_feed()
    }

    /// The session id of the round whose loop is current, if any.
    pub async fn current_session(&self) -> Option<SessionId> {
        self.round.lock().await.as_ref().map(|r| r.session_id)
    }

    /// Stop the current round's loop and wait for it.
    ///
    /// The game state is left as it was; a round in progress simply stops
    /// ticking. Returns the loop's result, or `None` if no round was started.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the loop failed or its task did not
    /// complete.
    pub async fn shutdown(&self) -> Result<Option<RoundResult>, SessionError> {
        let Some(active) = self.round.lock().await.take() else {
            return Ok(None);
        };
        active.control.request_stop(RoundEndReason::Shutdown).await;
        let result = active.handle.await??;
        info!(
            session_id = %result.session_id,
            reason = ?result.end_reason,
            "Session shut down"
        );
        Ok(Some(result))
    }

    async fn stop_round(previous: ActiveRound, reason: RoundEndReason) {
        previous.control.request_stop(reason).await;
        match previous.handle.await {
            Ok(Ok(result)) => {
                debug!(
                    session_id = %result.session_id,
                    reason = ?result.end_reason,
                    "Previous round loop joined"
                );
            }
            Ok(Err(err)) => {
                warn!(session_id = %previous.session_id, error = %err, "Previous round loop failed");
            }
            Err(err) => {
                warn!(session_id = %previous.session_id, error = %err, "Previous round task did not complete");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stockpile_types::GamePhase;

    use super::*;

    #[tokio::test]
    async fn new_session_publishes_intro() {
        let session = GameSession::new(&GameConfig::default());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Intro);
        assert_eq!(snapshot.session_id, None);
        assert!(session.current_session().await.is_none());
    }

    #[tokio::test]
    async fn adjust_before_start_is_ignored() {
        let session = GameSession::new(&GameConfig::default());
        let mut updates = session.subscribe();
        assert!(session.adjust(Category::Electronics, 10).await.is_none());
        assert!(!updates.has_changed().unwrap());
        assert_eq!(session.snapshot().item(Category::Electronics).unwrap().stock, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn feed_keeps_every_snapshot() {
        let session = GameSession::new(&GameConfig::default());
        let mut feed = session.subscribe_feed();

        session.start().await;
        session.adjust(Category::Electronics, 5).await.unwrap();
        session.adjust(Category::Electronics, 5).await.unwrap();

        let started = feed.recv().await.unwrap();
        assert_eq!(started.phase, GamePhase::Playing);
        assert_eq!(started.item(Category::Electronics).unwrap().stock, 50);
        assert_eq!(feed.recv().await.unwrap().item(Category::Electronics).unwrap().stock, 55);
        assert_eq!(feed.recv().await.unwrap().item(Category::Electronics).unwrap().stock, 60);
        assert_eq!(session.snapshot().item(Category::Electronics).unwrap().stock, 60);

        let _ = session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_without_round_is_empty() {
        let session = GameSession::new(&GameConfig::default());
        assert!(session.shutdown().await.unwrap().is_none());
    }
}
