//! Shared type definitions for the Stockpile warehouse game.
//!
//! This crate holds every type that crosses the boundary between the
//! simulation core and the presentation layer. Types flow downstream to
//! `TypeScript` via `ts-rs` so a browser client can render snapshots without
//! re-declaring them.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for round identifiers
//! - [`enums`] -- Categories, game phase, and alert kinds
//! - [`structs`] -- Alerts, inventory views, round results, and snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AlertKind, Category, GamePhase, ParseCategoryError};
pub use ids::SessionId;
pub use structs::{Alert, GameResult, GameSnapshot, ItemSnapshot};
