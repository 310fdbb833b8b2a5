//! # Utilities Module
//!
//! Line math and pathfinding shared by the visibility engine and monster AI.

pub mod math;
pub mod pathing;

pub use math::*;
pub use pathing::*;
