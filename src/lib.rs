//! # Delver
//!
//! Movable dungeon objects and the locomotion rules they share.
//!
//! ## Architecture Overview
//!
//! Every player, monster, item and staircase in the dungeon is the same
//! generic [`Object`]: a grid position, a `blocks` flag, and a handful of
//! optional capability records. Movement comes in three flavours:
//!
//! - **Stepping**: [`Object::move_by`] shifts the position unconditionally
//! - **Steering**: [`Object::move_towards`] takes one greedy step toward a
//!   point when the destination tile is free
//! - **Pathfinding**: [`Object::move_astar`] rebuilds a [`WalkabilityMap`]
//!   from terrain and blocking occupants, asks the [`PathPlanner`] for a
//!   bounded shortest path, and falls back to steering when none is usable
//!
//! The map and the occupant list are collaborators reached through the
//! [`MapView`] and [`OccupantRegistry`] traits. [`GameMap`] and
//! [`ObjectRegistry`] are the stock implementations.

pub mod game;
pub mod scenario;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use scenario::*;
pub use utils::*;

/// Core error type for the Delver crate.
#[derive(thiserror::Error, Debug)]
pub enum DelverError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Map text or dimensions are malformed
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Scenario description is inconsistent
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// No object with this id is registered
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),
}

/// Result type used throughout the Delver codebase.
pub type DelverResult<T> = Result<T, DelverError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Movement constants.
pub mod config {
    /// Paths with this many steps or more are ignored in favour of steering.
    pub const MAX_PATH_LENGTH: usize = 25;

    /// Cost of a diagonal step.
    pub const DIAGONAL_COST: f64 = 1.41;

    /// Cost of an orthogonal step.
    pub const ORTHOGONAL_COST: f64 = 1.0;

    /// Default turn limit for the scenario runner.
    pub const DEFAULT_SCENARIO_TURNS: u32 = 50;
}
