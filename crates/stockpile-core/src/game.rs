//! Game state and the player-facing operations on it.
//!
//! [`GameState`] is the single owner of everything the presentation layer
//! can observe. It is mutated only through [`GameState::start`],
//! [`GameState::adjust_stock`], and the tick cycle in [`crate::tick`].

use chrono::{DateTime, Utc};
use stockpile_types::{Alert, Category, GamePhase, GameResult, GameSnapshot, SessionId};
use tracing::{debug, info};

use crate::clock::RoundClock;
use crate::inventory::{Inventory, StockChange};
use crate::rules::{CLOSER_REWARD, MAX_ACCURACY};

/// Result of an accepted stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    /// The adjusted category.
    pub category: Category,
    /// Stock before and after.
    pub change: StockChange,
    /// Score awarded for the move (0 unless it moved stock closer to optimal).
    pub awarded: u32,
    /// Warning state of the line after the move.
    pub warning: bool,
}

/// The mutable state of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    session_id: Option<SessionId>,
    phase: GamePhase,
    score: u32,
    clock: RoundClock,
    stock_accuracy: u32,
    alerts: Vec<Alert>,
    inventory: Inventory,
    started_at: Option<DateTime<Utc>>,
    result: Option<GameResult>,
}

impl GameState {
    /// A game sitting on the intro screen.
    pub const fn new() -> Self {
        Self {
            session_id: None,
            phase: GamePhase::Intro,
            score: 0,
            clock: RoundClock::standard(),
            stock_accuracy: MAX_ACCURACY,
            alerts: Vec::new(),
            inventory: Inventory::new(),
            started_at: None,
            result: None,
        }
    }

    /// Reset every field and enter [`GamePhase::Playing`] under `session_id`.
    ///
    /// Valid from any phase; restarting mid-round discards the old round.
    pub fn start(&mut self, session_id: SessionId) {
        *self = Self {
            session_id: Some(session_id),
            phase: GamePhase::Playing,
            started_at: Some(Utc::now()),
            ..Self::new()
        };
        info!(%session_id, "Round started");
    }

    /// Add `amount` to `category`'s stock.
    ///
    /// Returns `None` and leaves the state untouched unless the game is
    /// [`GamePhase::Playing`]. Awards [`CLOSER_REWARD`] when the clamped
    /// result is strictly closer to optimal than before.
    pub fn adjust_stock(&mut self, category: Category, amount: i32) -> Option<Adjustment> {
        if self.phase != GamePhase::Playing {
            debug!(?category, amount, phase = ?self.phase, "Adjustment ignored outside play");
            return None;
        }

        let item = self.inventory.item_mut(category);
        let change = item.adjust(amount);
        let warning = item.warning();

        let awarded = if change.moved_closer() {
            CLOSER_REWARD
        } else {
            0
        };
        self.score = self.score.saturating_add(awarded);

        debug!(
            ?category,
            amount,
            previous = change.previous,
            current = change.current,
            awarded,
            "Stock adjusted"
        );

        Some(Adjustment {
            category,
            change,
            awarded,
            warning,
        })
    }

    /// Build the read-only projection published to the presentation layer.
    pub fn snapshot(&self) -> GameSnapshot {
        let alerts: Vec<String> = self.alerts.iter().map(ToString::to_string).collect();
        let alert_count = u32::try_from(alerts.len()).unwrap_or(u32::MAX);
        GameSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            score: self.score,
            day: self.clock.day(),
            time_remaining: self.clock.time_remaining(),
            stock_accuracy: self.stock_accuracy,
            alerts,
            alert_count,
            inventory: self
                .inventory
                .iter()
                .map(|(category, item)| (category, item.snapshot()))
                .collect(),
            result: self.result.clone(),
        }
    }

    /// The round currently (or last) played.
    pub const fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Whether this state belongs to round `session_id` and is still playing.
    pub fn is_playing_session(&self, session_id: SessionId) -> bool {
        self.phase == GamePhase::Playing && self.session_id == Some(session_id)
    }

    /// Current phase.
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Current score.
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Current stock accuracy.
    pub const fn stock_accuracy(&self) -> u32 {
        self.stock_accuracy
    }

    /// Alerts raised by the most recent demand tick.
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// The round clock.
    pub const fn clock(&self) -> &RoundClock {
        &self.clock
    }

    /// The inventory.
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Outcome of the finished round, if any.
    pub const fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub(crate) const fn clock_mut(&mut self) -> &mut RoundClock {
        &mut self.clock
    }

    pub(crate) const fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub(crate) const fn apply_penalty(&mut self, penalty: u32) {
        self.score = self.score.saturating_sub(penalty);
    }

    /// Shift accuracy by `impact`, clamped to `0..=MAX_ACCURACY`.
    pub(crate) fn apply_accuracy_impact(&mut self, impact: i32) {
        let shifted = i64::from(self.stock_accuracy)
            .saturating_add(i64::from(impact))
            .clamp(0, i64::from(MAX_ACCURACY));
        self.stock_accuracy = u32::try_from(shifted).unwrap_or(0);
    }

    pub(crate) fn replace_alerts(&mut self, alerts: Vec<Alert>) {
        self.alerts = alerts;
    }

    /// Enter [`GamePhase::Ended`] and record the round's result.
    pub(crate) fn finish(&mut self) {
        self.phase = GamePhase::Ended;
        let ended_at = Utc::now();
        if let Some(session_id) = self.session_id {
            let result = GameResult {
                session_id,
                final_score: self.score,
                stock_accuracy: self.stock_accuracy,
                days_simulated: self.clock.day().saturating_sub(1),
                started_at: self.started_at.unwrap_or(ended_at),
                ended_at,
            };
            info!(
                %session_id,
                final_score = result.final_score,
                stock_accuracy = result.stock_accuracy,
                days_simulated = result.days_simulated,
                "Round ended"
            );
            self.result = Some(result);
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::new();
        state.start(SessionId::new());
        state
    }

    #[test]
    fn new_game_is_on_intro() {
        let state = GameState::new();
        assert_eq!(state.phase(), GamePhase::Intro);
        assert_eq!(state.session_id(), None);
        assert_eq!(state.score(), 0);
        assert_eq!(state.stock_accuracy(), 100);
        assert!(state.alerts().is_empty());
        assert!(state.result().is_none());
    }

    #[test]
    fn start_resets_everything() {
        let mut state = playing();
        let _ = state.adjust_stock(Category::Apparel, -30);
        state.apply_penalty(3);
        state.apply_accuracy_impact(-40);
        state.replace_alerts(vec![Alert::stockout(Category::Apparel)]);
        let _ = state.clock_mut().advance();
        state.finish();

        let session = SessionId::new();
        state.start(session);

        assert_eq!(state.session_id(), Some(session));
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.score(), 0);
        assert_eq!(state.clock().day(), 1);
        assert_eq!(state.clock().time_remaining(), 30);
        assert_eq!(state.stock_accuracy(), 100);
        assert!(state.alerts().is_empty());
        assert!(state.result().is_none());
        assert_eq!(state.inventory(), &Inventory::new());
    }

    #[test]
    fn start_snapshot_matches_initial_inventory() {
        let snapshot = playing().snapshot();
        let electronics = snapshot.item(Category::Electronics).unwrap();
        assert_eq!(electronics.stock, 50);
        assert_eq!(electronics.demand, 10);
        assert_eq!(electronics.optimal, 50);
        assert!(!electronics.warning);
        assert_eq!(snapshot.inventory.len(), 3);
    }

    #[test]
    fn moving_away_from_optimal_awards_nothing() {
        let mut state = playing();
        let adjustment = state.adjust_stock(Category::Electronics, -10).unwrap();
        assert_eq!(adjustment.change.current, 40);
        assert_eq!(adjustment.awarded, 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.inventory().item(Category::Electronics).stock(), 40);
    }

    #[test]
    fn moving_closer_awards_reward() {
        let mut state = playing();
        let _ = state.adjust_stock(Category::Electronics, -10);
        let adjustment = state.adjust_stock(Category::Electronics, 1).unwrap();
        assert_eq!(adjustment.awarded, CLOSER_REWARD);
        assert_eq!(state.score(), 5);
    }

    #[test]
    fn large_adjustment_clamps_and_warns() {
        let mut state = playing();
        let adjustment = state.adjust_stock(Category::Electronics, 60).unwrap();
        assert_eq!(adjustment.change.current, 100);
        assert!(adjustment.warning);
        assert!(state.inventory().item(Category::Electronics).warning());
    }

    #[test]
    fn clamped_no_op_still_scores_on_clamped_value() {
        let mut state = playing();
        let _ = state.adjust_stock(Category::Apparel, -100);
        let adjustment = state.adjust_stock(Category::Apparel, -1).unwrap();
        assert_eq!(adjustment.change.previous, 0);
        assert_eq!(adjustment.change.current, 0);
        assert_eq!(adjustment.awarded, 0);
    }

    #[test]
    fn adjust_only_touches_target_category() {
        let mut state = playing();
        let before = state.clone();
        let _ = state.adjust_stock(Category::Accessories, 7);
        assert_eq!(
            state.inventory().item(Category::Electronics),
            before.inventory().item(Category::Electronics)
        );
        assert_eq!(
            state.inventory().item(Category::Apparel),
            before.inventory().item(Category::Apparel)
        );
        assert_eq!(state.clock(), before.clock());
        assert_eq!(state.stock_accuracy(), before.stock_accuracy());
    }

    #[test]
    fn adjust_outside_play_changes_nothing() {
        let mut intro = GameState::new();
        let before = intro.clone();
        assert!(intro.adjust_stock(Category::Electronics, 10).is_none());
        assert_eq!(intro, before);

        let mut ended = playing();
        ended.finish();
        let before = ended.clone();
        assert!(ended.adjust_stock(Category::Electronics, -10).is_none());
        assert_eq!(ended, before);
    }

    #[test]
    fn round_trip_adjustment_restores_stock() {
        let mut state = playing();
        let _ = state.adjust_stock(Category::Apparel, -20);
        let out = state.adjust_stock(Category::Apparel, 10).unwrap();
        let back = state.adjust_stock(Category::Apparel, -10).unwrap();
        assert_eq!(back.change.current, 30);
        assert_eq!(out.awarded, CLOSER_REWARD);
        assert_eq!(back.awarded, 0);
    }

    #[test]
    fn accuracy_is_clamped() {
        let mut state = playing();
        state.apply_accuracy_impact(5);
        assert_eq!(state.stock_accuracy(), 100);
        state.apply_accuracy_impact(-250);
        assert_eq!(state.stock_accuracy(), 0);
        state.apply_accuracy_impact(i32::MIN);
        assert_eq!(state.stock_accuracy(), 0);
    }

    #[test]
    fn penalty_floors_at_zero() {
        let mut state = playing();
        let _ = state.adjust_stock(Category::Apparel, -1);
        let _ = state.adjust_stock(Category::Apparel, 1);
        assert_eq!(state.score(), 5);
        state.apply_penalty(10);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn finish_records_result() {
        let mut state = playing();
        let session = state.session_id().unwrap();
        let _ = state.clock_mut().next_day();
        state.finish();

        assert_eq!(state.phase(), GamePhase::Ended);
        let result = state.result().unwrap();
        assert_eq!(result.session_id, session);
        assert_eq!(result.days_simulated, 1);
        assert!(result.ended_at >= result.started_at);
        assert_eq!(state.snapshot().result.as_ref(), Some(result));
    }

    #[test]
    fn session_matching() {
        let state = playing();
        let session = state.session_id().unwrap();
        assert!(state.is_playing_session(session));
        assert!(!state.is_playing_session(SessionId::new()));
    }
}
