//! Tick cycle: one clock step of a running round.
//!
//! Each tick runs two phases:
//!
//! 1. **Clock** -- count the round timer down by one. If it reaches zero the
//!    round ends immediately and no demand is processed for that tick.
//!
//! 2. **Demand** -- for every category in processing order, draw the day's
//!    demand, fulfil it or record a stockout, check for overstock, and
//!    refresh the line's warning. Accuracy moves by the summed impact and
//!    the alert list is replaced with this tick's alerts.
//!
//! Given the same state and the same [`DemandSource`] outputs, a tick is
//! deterministic.

use stockpile_types::{Alert, Category, GamePhase, SessionId};
use tracing::debug;

use crate::clock::{ClockError, ClockTick};
use crate::demand::{self, DemandSource, NegativeDemand};
use crate::game::GameState;
use crate::inventory::clamp_stock;
use crate::rules::{
    FULFILLED_IMPACT, OVERSTOCK_IMPACT, OVERSTOCK_PENALTY, STOCKOUT_IMPACT, STOCKOUT_PENALTY,
};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// Ticks only run while a round is being played.
    #[error("cannot tick while the game is {phase:?}")]
    NotPlaying {
        /// The phase the game was in.
        phase: GamePhase,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Whether a category covered its demand for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fulfilment {
    /// Demand was taken out of stock.
    Fulfilled,
    /// Stock was short; nothing was taken.
    Stockout,
}

/// What happened to one category during a demand tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOutcome {
    /// The category.
    pub category: Category,
    /// Demand drawn for the day, after the negative-demand policy.
    pub daily_demand: i64,
    /// Whether the demand was covered.
    pub fulfilment: Fulfilment,
    /// Whether the line ended the day overstocked.
    pub overstock: bool,
    /// Stock after the day.
    pub stock_after: u32,
}

/// Aggregate result of one demand tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandReport {
    /// Per-category outcomes in processing order.
    pub outcomes: Vec<CategoryOutcome>,
    /// Net accuracy change applied.
    pub accuracy_impact: i32,
    /// Total score penalty attempted (before flooring at zero).
    pub score_penalty: u32,
    /// Alerts raised, in processing order.
    pub alerts: Vec<Alert>,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The round the tick belongs to.
    pub session_id: Option<SessionId>,
    /// Simulated day after the tick.
    pub day: u32,
    /// Seconds left after the tick.
    pub time_remaining: u32,
    /// Score after the tick.
    pub score: u32,
    /// Accuracy after the tick.
    pub stock_accuracy: u32,
    /// Demand processing, absent on the tick that ends the round.
    pub demand: Option<DemandReport>,
    /// Whether this tick ended the round.
    pub round_over: bool,
}

/// Run the demand phase for every category.
///
/// Mutates stock, score, accuracy, and alerts on `state`. Stock never leaves
/// `0..=MAX_STOCK` whatever the sign or size of the drawn demand.
pub fn process_demand(
    state: &mut GameState,
    source: &mut dyn DemandSource,
    policy: NegativeDemand,
) -> DemandReport {
    let mut outcomes = Vec::with_capacity(Category::ALL.len());
    let mut alerts = Vec::new();
    let mut accuracy_impact: i32 = 0;
    let mut score_penalty: u32 = 0;

    for category in Category::ALL {
        let item = state.inventory_mut().item_mut(category);
        let daily_demand = demand::daily_demand(item.demand(), source.perturbation(category), policy);
        let stock = i64::from(item.stock());

        let fulfilment = if stock >= daily_demand {
            item.set_stock(clamp_stock(stock.saturating_sub(daily_demand)));
            accuracy_impact = accuracy_impact.saturating_add(FULFILLED_IMPACT);
            Fulfilment::Fulfilled
        } else {
            alerts.push(Alert::stockout(category));
            accuracy_impact = accuracy_impact.saturating_add(STOCKOUT_IMPACT);
            score_penalty = score_penalty.saturating_add(STOCKOUT_PENALTY);
            Fulfilment::Stockout
        };

        let overstock = item.is_overstocked();
        if overstock {
            alerts.push(Alert::overstock(category));
            accuracy_impact = accuracy_impact.saturating_add(OVERSTOCK_IMPACT);
            score_penalty = score_penalty.saturating_add(OVERSTOCK_PENALTY);
        }

        outcomes.push(CategoryOutcome {
            category,
            daily_demand,
            fulfilment,
            overstock,
            stock_after: item.stock(),
        });
    }

    state.apply_penalty(score_penalty);
    state.apply_accuracy_impact(accuracy_impact);
    state.replace_alerts(alerts.clone());

    DemandReport {
        outcomes,
        accuracy_impact,
        score_penalty,
        alerts,
    }
}

/// Execute one tick of a running round.
///
/// Counts the clock down; if it expires the round ends without a demand
/// phase, otherwise the day advances and demand is processed.
///
/// # Errors
///
/// Returns [`TickError::NotPlaying`] outside [`GamePhase::Playing`], or
/// [`TickError::Clock`] if the clock is already expired.
pub fn run_tick(
    state: &mut GameState,
    source: &mut dyn DemandSource,
    policy: NegativeDemand,
) -> Result<TickSummary, TickError> {
    if state.phase() != GamePhase::Playing {
        return Err(TickError::NotPlaying {
            phase: state.phase(),
        });
    }

    let (demand, round_over) = match state.clock_mut().advance()? {
        ClockTick::Expired => {
            state.finish();
            (None, true)
        }
        ClockTick::Running { .. } => {
            let report = process_demand(state, source, policy);
            let _ = state.clock_mut().next_day();
            (Some(report), false)
        }
    };

    let summary = TickSummary {
        session_id: state.session_id(),
        day: state.clock().day(),
        time_remaining: state.clock().time_remaining(),
        score: state.score(),
        stock_accuracy: state.stock_accuracy(),
        demand,
        round_over,
    };

    debug!(
        day = summary.day,
        time_remaining = summary.time_remaining,
        score = summary.score,
        stock_accuracy = summary.stock_accuracy,
        alerts = state.alerts().len(),
        round_over,
        "Tick complete"
    );

    Ok(summary)
}
