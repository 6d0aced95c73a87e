//! Structs shared between the simulation core and the presentation layer.
//!
//! [`GameSnapshot`] is the read-only projection handed to the presentation
//! layer after every state change. Field names serialize in camelCase so a
//! browser client can consume the JSON (and the generated `TypeScript`
//! bindings) directly.

use core::fmt;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AlertKind, Category, GamePhase};
use crate::ids::SessionId;

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// A single alert raised during the most recent demand tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// What went wrong.
    pub kind: AlertKind,
    /// Which category it went wrong for.
    pub category: Category,
}

impl Alert {
    /// Stock could not cover today's demand for `category`.
    pub const fn stockout(category: Category) -> Self {
        Self {
            kind: AlertKind::Stockout,
            category,
        }
    }

    /// `category` is holding too much stock.
    pub const fn overstock(category: Category) -> Self {
        Self {
            kind: AlertKind::Overstock,
            category,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.category)
    }
}

// ---------------------------------------------------------------------------
// Inventory view
// ---------------------------------------------------------------------------

/// Read-only view of one inventory line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ItemSnapshot {
    /// Units on hand.
    pub stock: u32,
    /// Base daily demand.
    pub demand: u32,
    /// Target stock level.
    pub optimal: u32,
    /// Whether the line is under- or over-stocked.
    pub warning: bool,
    /// Stock as a percentage of warehouse capacity, for gauges.
    pub fill_percent: u32,
}

// ---------------------------------------------------------------------------
// Round result
// ---------------------------------------------------------------------------

/// Final outcome of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameResult {
    /// The round this result belongs to.
    pub session_id: SessionId,
    /// Score when the timer ran out.
    pub final_score: u32,
    /// Stock accuracy when the timer ran out.
    pub stock_accuracy: u32,
    /// Number of demand days that were simulated.
    pub days_simulated: u32,
    /// Wall-clock time the round was started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time the round ended.
    pub ended_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Complete observable game state, published after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameSnapshot {
    /// The round in progress (or last finished), `None` before the first start.
    pub session_id: Option<SessionId>,
    /// Current phase.
    pub phase: GamePhase,
    /// Current score.
    pub score: u32,
    /// Current simulated day (starts at 1).
    pub day: u32,
    /// Seconds left on the round timer.
    pub time_remaining: u32,
    /// Stock accuracy percentage.
    pub stock_accuracy: u32,
    /// Alerts from the most recent demand tick, e.g. `"Stockout: apparel"`.
    pub alerts: Vec<String>,
    /// Number of alerts in `alerts`.
    pub alert_count: u32,
    /// Every inventory line, keyed by category.
    pub inventory: BTreeMap<Category, ItemSnapshot>,
    /// Final outcome, present once the phase is `ended`.
    pub result: Option<GameResult>,
}

impl GameSnapshot {
    /// Look up the inventory line for `category`.
    pub fn item(&self, category: Category) -> Option<&ItemSnapshot> {
        self.inventory.get(&category)
    }
}
