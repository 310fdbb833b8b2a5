//! # Generation Module
//!
//! Procedural content generation for dungeon levels, monsters and items.
//!
//! All randomness flows from a single seeded [`GameRng`], so the same seed
//! always produces the same level, down to entity ids.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;

use crate::config::MAX_MAP_DIMENSION;
use crate::game::{Entity, Grid, Position};
use crate::{DelveError, DelveResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// The random stream owned by a game. Serializable, so a saved game resumes
/// the exact same sequence.
pub type GameRng = rand_chacha::ChaCha8Rng;

/// Configuration for procedural generation.
///
/// Room sizes include the surrounding walls; a room of size 6 has a 4x4
/// floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    pub map_width: u32,
    pub map_height: u32,
    /// Room placement iterations per level
    pub max_rooms: u32,
    /// Minimum room size
    pub room_min_size: u32,
    /// Maximum room size
    pub room_max_size: u32,
    pub max_monsters_per_room: u32,
    pub max_items_per_room: u32,
    /// Candidate rectangles tried per placement iteration before giving up on it
    pub max_placement_attempts: u32,
    /// Extra clearance, in tiles, required between room rectangles
    pub room_spacing: u32,
}

impl GenerationConfig {
    /// Creates the default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.map_width, 80);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            map_width: crate::config::DEFAULT_MAP_WIDTH,
            map_height: crate::config::DEFAULT_MAP_HEIGHT,
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
            max_monsters_per_room: 2,
            max_items_per_room: 2,
            max_placement_attempts: 50,
            room_spacing: 0,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            map_width: 40,
            map_height: 24,
            max_rooms: 8,
            room_min_size: 4,
            room_max_size: 7,
            max_monsters_per_room: 1,
            max_items_per_room: 1,
            max_placement_attempts: 30,
            room_spacing: 0,
        }
    }

    /// Checks that rooms of every configured size can be placed on the map.
    pub fn validate(&self) -> DelveResult<()> {
        if self.map_width > MAX_MAP_DIMENSION || self.map_height > MAX_MAP_DIMENSION {
            return Err(DelveError::InvalidConfig(format!(
                "map {}x{} exceeds the {} tile limit per side",
                self.map_width, self.map_height, MAX_MAP_DIMENSION
            )));
        }
        if self.room_min_size < 3 {
            return Err(DelveError::InvalidConfig(format!(
                "room_min_size must be at least 3 to leave a floor, got {}",
                self.room_min_size
            )));
        }
        if self.room_min_size > self.room_max_size {
            return Err(DelveError::InvalidConfig(format!(
                "room_min_size {} exceeds room_max_size {}",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.room_max_size > self.map_width || self.room_max_size > self.map_height {
            return Err(DelveError::InvalidConfig(format!(
                "rooms up to {} tiles do not fit a {}x{} map",
                self.room_max_size, self.map_width, self.map_height
            )));
        }
        if self.max_placement_attempts == 0 {
            return Err(DelveError::InvalidConfig(
                "max_placement_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A rectangular room, walls included. Only used while generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Top-left corner of the room
    pub top_left: Position,
    /// Width of the room (including walls)
    pub width: u32,
    /// Height of the room (including walls)
    pub height: u32,
}

impl Room {
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, Room};
    ///
    /// let room = Room::new(Position::new(5, 5), 10, 8);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert!(room.contains(Position::new(7, 7)));
    /// ```
    pub fn new(top_left: Position, width: u32, height: u32) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }

    /// Inclusive bounding-box test, widened by `spacing` tiles.
    ///
    /// Rooms sharing a wall tile intersect; with `spacing` 1, rooms whose
    /// walls are merely adjacent intersect too.
    pub fn intersects(&self, other: &Room, spacing: u32) -> bool {
        let gap = spacing as i32;
        let a = self.bottom_right();
        let b = other.bottom_right();
        self.top_left.x <= b.x + gap
            && a.x + gap >= other.top_left.x
            && self.top_left.y <= b.y + gap
            && a.y + gap >= other.top_left.y
    }

    /// Whether the room lies entirely inside a `width` x `height` map.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        let br = self.bottom_right();
        self.top_left.x >= 0
            && self.top_left.y >= 0
            && br.x < width as i32
            && br.y < height as i32
    }

    /// Gets all floor positions within this room.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in (self.top_left.y + 1)..(self.top_left.y + self.height as i32 - 1) {
            for x in (self.top_left.x + 1)..(self.top_left.x + self.width as i32 - 1) {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }
}

/// A freshly generated level, before it is handed to the game state.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub grid: Grid,
    pub player_spawn: Position,
    pub stairs: Option<Position>,
    /// Monsters and floor items, already positioned
    pub entities: Vec<Entity>,
    /// Accepted rooms, in placement order
    pub rooms: Vec<Room>,
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut GameRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Builds a fresh, unpositioned entity from a template.
pub type Prototype = fn() -> Entity;

/// Prototype table whose weights change with dungeon depth.
///
/// Each entry lists `(min_depth, weight)` steps; the weight in force is the
/// one from the deepest step not below the current depth.
#[derive(Debug, Clone)]
pub struct SpawnTable<T> {
    entries: Vec<(T, Vec<(u32, u32)>)>,
}

impl<T> SpawnTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a prototype with its depth steps.
    pub fn with(mut self, value: T, steps: &[(u32, u32)]) -> Self {
        self.entries.push((value, steps.to_vec()));
        self
    }

    /// Weight in force at `depth` for one entry's steps.
    fn weight_at(steps: &[(u32, u32)], depth: u32) -> u32 {
        steps
            .iter()
            .filter(|(min_depth, _)| *min_depth <= depth)
            .max_by_key(|(min_depth, _)| *min_depth)
            .map(|(_, weight)| *weight)
            .unwrap_or(0)
    }

    /// Entries available at `depth` with their weights.
    pub fn weights(&self, depth: u32) -> Vec<(&T, u32)> {
        self.entries
            .iter()
            .map(|(value, steps)| (value, Self::weight_at(steps, depth)))
            .filter(|(_, weight)| *weight > 0)
            .collect()
    }

    /// Draws one entry at `depth`, or `None` if nothing can spawn there.
    pub fn choose<R: Rng + ?Sized>(&self, depth: u32, rng: &mut R) -> Option<&T> {
        let weighted = self.weights(depth);
        let dist = WeightedIndex::new(weighted.iter().map(|(_, w)| *w)).ok()?;
        weighted.get(dist.sample(rng)).map(|(value, _)| *value)
    }
}

impl<T> Default for SpawnTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> GameRng {
    GameRng::seed_from_u64(config.seed)
}

/// Checks that a level has floor and that every walkable tile is reachable
/// from `start` by cardinal steps.
pub fn validate_connectivity(grid: &Grid, start: Position) -> DelveResult<()> {
    if !grid.is_walkable(start) {
        return Err(DelveError::GenerationFailed(format!(
            "Start position {:?} is not walkable",
            start
        )));
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for next in pos.cardinal_adjacent_positions() {
            if grid.is_walkable(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let walkable = grid.walkable_count();
    if visited.len() != walkable {
        return Err(DelveError::GenerationFailed(format!(
            "Only {} of {} walkable tiles are reachable",
            visited.len(),
            walkable
        )));
    }
    Ok(())
}

/// Checks that a level has at least one walkable tile.
pub fn validate_level(grid: &Grid) -> DelveResult<()> {
    if grid.walkable_count() == 0 {
        return Err(DelveError::GenerationFailed(
            "Level has no floor tiles".to_string(),
        ));
    }
    Ok(())
}
