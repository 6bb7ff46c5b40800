//! # Utilities Module
//!
//! Walkability snapshots and path planning.

pub mod pathfinding;

pub use self::pathfinding::*;
