//! # Rendering Module
//!
//! Render collaborator for the simulation. It reads the grid's per-tile
//! glyphs and the ordered list of visible entities and never mutates state.

pub mod display;

pub use display::*;
