//! Game rules, round clock, tick cycle, and session runtime for Stockpile.
//!
//! This crate owns the warehouse simulation: a 30-second round in which the
//! player nudges three stock lines toward their optimal level while a
//! once-per-second tick draws daily demand against them.
//!
//! # Modules
//!
//! - [`rules`] -- Fixed game constants and the warning/overstock predicates.
//! - [`inventory`] -- Per-category stock lines with clamped mutation.
//! - [`clock`] -- Round countdown and simulated day counter.
//! - [`demand`] -- [`DemandSource`] trait, [`RandomDemand`], and
//!   [`ScriptedDemand`].
//! - [`game`] -- [`GameState`] with `start`, `adjust_stock`, and snapshots.
//! - [`tick`] -- One tick: clock countdown, then the demand phase.
//! - [`runner`] -- The async per-round tick loop with stop controls.
//! - [`session`] -- [`GameSession`], the runtime host wiring it together.
//! - [`config`] -- Host configuration loaded from `stockpile-config.yaml`.
//!
//! [`DemandSource`]: demand::DemandSource
//! [`RandomDemand`]: demand::RandomDemand
//! [`ScriptedDemand`]: demand::ScriptedDemand
//! [`GameState`]: game::GameState
//! [`GameSession`]: session::GameSession

pub mod clock;
pub mod config;
pub mod demand;
pub mod game;
pub mod inventory;
pub mod rules;
pub mod runner;
pub mod session;
pub mod tick;
