//! Enumeration types for the Stockpile game.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A stock category held in the warehouse.
///
/// The set is closed: every game tracks exactly these three categories, and
/// the declaration order is the order in which daily demand is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    /// Consumer electronics.
    Electronics,
    /// Clothing.
    Apparel,
    /// Small add-on goods.
    Accessories,
}

impl Category {
    /// Every category, in processing order.
    pub const ALL: [Self; 3] = [Self::Electronics, Self::Apparel, Self::Accessories];

    /// The lowercase name used in alerts and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Apparel => "apparel",
            Self::Accessories => "accessories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a textual category name does not match any [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {name}")]
pub struct ParseCategoryError {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "electronics" => Ok(Self::Electronics),
            "apparel" => Ok(Self::Apparel),
            "accessories" => Ok(Self::Accessories),
            other => Err(ParseCategoryError {
                name: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Game phase
// ---------------------------------------------------------------------------

/// The phase of a game.
///
/// `Intro -> Playing` and `Ended -> Playing` happen on `start`;
/// `Playing -> Ended` happens when the round timer reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum GamePhase {
    /// No round has been started yet.
    #[default]
    Intro,
    /// A round is in progress and the clock is ticking.
    Playing,
    /// The round timer ran out.
    Ended,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// The kind of problem raised for a category during a demand tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AlertKind {
    /// Stock could not cover the day's demand.
    Stockout,
    /// Stock sits above one and a half times the optimal level.
    Overstock,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stockout => f.write_str("Stockout"),
            Self::Overstock => f.write_str("Overstock"),
        }
    }
}
