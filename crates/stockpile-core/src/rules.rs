//! Fixed game rules.
//!
//! These values are the game's balance and are not part of
//! [`GameConfig`](crate::config::GameConfig).

use stockpile_types::Category;

/// Length of a round in clock ticks (seconds at the default period).
pub const ROUND_SECONDS: u32 = 30;

/// Stock every category starts a round with.
pub const INITIAL_STOCK: u32 = 50;

/// Target stock level for every category.
pub const OPTIMAL_STOCK: u32 = 50;

/// Warehouse capacity per category.
pub const MAX_STOCK: u32 = 100;

/// Stock accuracy at the start of a round, also its upper bound.
pub const MAX_ACCURACY: u32 = 100;

/// Score awarded when an adjustment moves stock strictly closer to optimal.
pub const CLOSER_REWARD: u32 = 5;

/// Score lost when a category cannot cover its daily demand.
pub const STOCKOUT_PENALTY: u32 = 10;

/// Score lost when a category ends a day overstocked.
pub const OVERSTOCK_PENALTY: u32 = 5;

/// Accuracy change for a fulfilled day.
pub const FULFILLED_IMPACT: i32 = 1;

/// Accuracy change for a stockout.
pub const STOCKOUT_IMPACT: i32 = -2;

/// Accuracy change for an overstocked day.
pub const OVERSTOCK_IMPACT: i32 = -1;

/// Daily demand varies uniformly within `base +/- DEMAND_SPREAD`.
pub const DEMAND_SPREAD: i32 = 2;

/// Base daily demand for a category.
pub const fn base_demand(category: Category) -> u32 {
    match category {
        Category::Electronics => 10,
        Category::Apparel => 8,
        Category::Accessories => 15,
    }
}

/// `stock > optimal * 1.5`, evaluated in integers.
pub const fn is_overstocked(stock: u32, optimal: u32) -> bool {
    stock.saturating_mul(2) > optimal.saturating_mul(3)
}

/// A line is flagged when it holds less than two days of demand or is
/// overstocked.
pub const fn is_warning(stock: u32, demand: u32, optimal: u32) -> bool {
    stock < demand.saturating_mul(2) || is_overstocked(stock, optimal)
}
