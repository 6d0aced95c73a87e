//! Demand sources: where daily randomness enters the game.
//!
//! Each demand tick asks a [`DemandSource`] for a perturbation per category
//! and adds it to the category's base demand. [`RandomDemand`] draws from a
//! seedable RNG; [`ScriptedDemand`] replays a fixed sequence, which keeps
//! tests and replays deterministic.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use stockpile_types::Category;

use crate::rules::DEMAND_SPREAD;

/// How a negative daily demand (base demand plus a negative perturbation)
/// is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeDemand {
    /// Negative demand counts as zero: stock is never increased by a tick.
    #[default]
    Floor,
    /// Negative demand is applied as-is and returns stock to the warehouse
    /// (still capped at capacity).
    Signed,
}

impl NegativeDemand {
    /// Apply the policy to a raw daily demand figure.
    pub const fn apply(self, raw: i64) -> i64 {
        match self {
            Self::Floor => {
                if raw < 0 {
                    0
                } else {
                    raw
                }
            }
            Self::Signed => raw,
        }
    }
}

/// Combine a base demand and a perturbation under `policy`.
pub fn daily_demand(base: u32, perturbation: i32, policy: NegativeDemand) -> i64 {
    policy.apply(i64::from(base).saturating_add(i64::from(perturbation)))
}

/// A source of per-tick demand perturbations.
///
/// The core calls [`perturbation`](DemandSource::perturbation) once per
/// category per demand tick, in category processing order.
pub trait DemandSource: Send {
    /// Perturbation to add to `category`'s base demand for this tick.
    fn perturbation(&mut self, category: Category) -> i32;
}

/// Uniform random perturbations in `-DEMAND_SPREAD..=DEMAND_SPREAD`.
#[derive(Debug, Clone)]
pub struct RandomDemand {
    rng: SmallRng,
}

impl RandomDemand {
    /// A reproducible source seeded with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// A source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl DemandSource for RandomDemand {
    fn perturbation(&mut self, _category: Category) -> i32 {
        self.rng.random_range(-DEMAND_SPREAD..=DEMAND_SPREAD)
    }
}

/// Replays a fixed queue of perturbations, then returns 0 forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDemand {
    queue: VecDeque<i32>,
}

impl ScriptedDemand {
    /// Replay `perturbations` in order.
    pub fn new(perturbations: impl IntoIterator<Item = i32>) -> Self {
        Self {
            queue: perturbations.into_iter().collect(),
        }
    }

    /// Always perturb by zero: every day's demand equals the base demand.
    pub fn steady() -> Self {
        Self::default()
    }

    /// Perturbations not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DemandSource for ScriptedDemand {
    fn perturbation(&mut self, _category: Category) -> i32 {
        self.queue.pop_front().unwrap_or(0)
    }
}
