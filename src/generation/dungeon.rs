//! # Dungeon Generation
//!
//! Room-and-corridor level generation.
//!
//! The generator:
//! 1. Places non-overlapping rectangular rooms, retrying a bounded number of
//!    candidates per room
//! 2. Joins each room to the previous one with an L-shaped corridor
//! 3. Puts the player in the first room and the stairs in the last
//! 4. Seeds every room with monsters and items from depth-weighted tables

use crate::game::{seeded_entity_id, Entity, Grid, Position, TileKind};
use crate::generation::{
    encounters, items, validate_connectivity, validate_level, GameRng, GeneratedLevel,
    GenerationConfig, Generator, Prototype, Room, SpawnTable,
};
use crate::{DelveError, DelveResult};
use log::{debug, warn};
use rand::Rng;
use std::collections::HashSet;

/// Primary dungeon generator using the room-and-corridor algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomCorridorGenerator {
    /// Dungeon depth, used to weight the spawn tables
    pub depth: u32,
}

impl RoomCorridorGenerator {
    /// Creates a generator for the given dungeon depth.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{create_rng, GenerationConfig, Generator, RoomCorridorGenerator};
    ///
    /// let config = GenerationConfig::new(12345);
    /// let level = RoomCorridorGenerator::new(1)
    ///     .generate(&config, &mut create_rng(&config))
    ///     .unwrap();
    /// assert!(level.grid.is_walkable(level.player_spawn));
    /// ```
    pub fn new(depth: u32) -> Self {
        Self {
            depth: depth.max(1),
        }
    }

    /// Places and carves rooms. Always returns at least one room.
    fn place_rooms(
        &self,
        grid: &mut Grid,
        config: &GenerationConfig,
        rng: &mut GameRng,
    ) -> DelveResult<Vec<Room>> {
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..config.max_rooms {
            let accepted = (0..config.max_placement_attempts)
                .map(|_| self.generate_room_candidate(config, rng))
                .find(|candidate| {
                    rooms
                        .iter()
                        .all(|room| !candidate.intersects(room, config.room_spacing))
                });

            if let Some(room) = accepted {
                self.carve_room(grid, &room)?;
                if let Some(previous) = rooms.last() {
                    let (start, end) = (previous.center(), room.center());
                    let horizontal_first = (end.x - start.x).abs() >= (end.y - start.y).abs();
                    self.carve_l_corridor(grid, start, end, horizontal_first)?;
                }
                rooms.push(room);
            }
        }

        if rooms.is_empty() {
            warn!(
                "No room could be placed in {} iterations; forcing one",
                config.max_rooms
            );
            let room = self.generate_room_candidate(config, rng);
            self.carve_room(grid, &room)?;
            rooms.push(room);
        }

        Ok(rooms)
    }

    /// Samples a room that fits the map.
    fn generate_room_candidate(&self, config: &GenerationConfig, rng: &mut GameRng) -> Room {
        let width = rng.gen_range(config.room_min_size..=config.room_max_size);
        let height = rng.gen_range(config.room_min_size..=config.room_max_size);
        let x = rng.gen_range(0..=config.map_width - width) as i32;
        let y = rng.gen_range(0..=config.map_height - height) as i32;
        Room::new(Position::new(x, y), width, height)
    }

    /// Turns the interior of a room into floor; the border stays wall.
    fn carve_room(&self, grid: &mut Grid, room: &Room) -> DelveResult<()> {
        for pos in room.floor_positions() {
            grid.set_tile(pos, TileKind::Floor)?;
        }
        Ok(())
    }

    /// Carves an L-shaped corridor between two points.
    fn carve_l_corridor(
        &self,
        grid: &mut Grid,
        start: Position,
        end: Position,
        horizontal_first: bool,
    ) -> DelveResult<()> {
        let corner = if horizontal_first {
            Position::new(end.x, start.y)
        } else {
            Position::new(start.x, end.y)
        };

        for (from, to) in [(start, corner), (corner, end)] {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                for x in from.x.min(to.x)..=from.x.max(to.x) {
                    let pos = Position::new(x, y);
                    if grid.tile(pos) == Some(TileKind::Wall) {
                        grid.set_tile(pos, TileKind::Floor)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Places the down stairs at the center of the last room, or elsewhere in
    /// the spawn room when it is the only one.
    fn add_stairs(&self, grid: &mut Grid, rooms: &[Room], spawn: Position) -> DelveResult<Position> {
        let last = rooms
            .last()
            .ok_or_else(|| DelveError::GenerationFailed("No rooms to place stairs in".to_string()))?;

        let stairs = if last.center() != spawn {
            last.center()
        } else {
            last.floor_positions()
                .into_iter()
                .rev()
                .find(|pos| *pos != spawn)
                .unwrap_or(spawn)
        };
        grid.set_tile(stairs, TileKind::DownStairs)?;
        Ok(stairs)
    }

    /// Seeds a room with monsters and items on distinct free floor tiles.
    fn populate_room(
        &self,
        room: &Room,
        config: &GenerationConfig,
        occupied: &mut HashSet<Position>,
        rng: &mut GameRng,
    ) -> Vec<Entity> {
        let floor = room.floor_positions();
        let monster_count = rng.gen_range(0..=config.max_monsters_per_room);
        let item_count = rng.gen_range(0..=config.max_items_per_room);

        let mut spawned = Vec::new();
        let monster_table = encounters::monster_table();
        for _ in 0..monster_count {
            spawned.extend(self.spawn_from(&monster_table, &floor, occupied, rng));
        }
        let item_table = items::item_table();
        for _ in 0..item_count {
            spawned.extend(self.spawn_from(&item_table, &floor, occupied, rng));
        }
        spawned
    }

    /// Draws one prototype onto a random floor tile. A tile that is already
    /// taken forfeits the spawn.
    fn spawn_from(
        &self,
        table: &SpawnTable<Prototype>,
        floor: &[Position],
        occupied: &mut HashSet<Position>,
        rng: &mut GameRng,
    ) -> Option<Entity> {
        let pos = floor[rng.gen_range(0..floor.len())];
        if occupied.contains(&pos) {
            return None;
        }
        let prototype = table.choose(self.depth, rng)?;
        occupied.insert(pos);
        Some(prototype().spawn(seeded_entity_id(rng), pos))
    }
}

impl Generator<GeneratedLevel> for RoomCorridorGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut GameRng) -> DelveResult<GeneratedLevel> {
        config.validate()?;

        let mut grid = Grid::new(config.map_width, config.map_height, TileKind::Wall);
        let rooms = self.place_rooms(&mut grid, config, rng)?;

        let player_spawn = rooms
            .first()
            .map(Room::center)
            .ok_or_else(|| DelveError::GenerationFailed("Failed to place any rooms".to_string()))?;
        let stairs = self.add_stairs(&mut grid, &rooms, player_spawn)?;

        let mut occupied = HashSet::from([player_spawn]);
        let mut entities = Vec::new();
        for room in &rooms {
            entities.extend(self.populate_room(room, config, &mut occupied, rng));
        }

        let level = GeneratedLevel {
            grid,
            player_spawn,
            stairs: Some(stairs),
            entities,
            rooms,
        };
        self.validate(&level, config)?;

        debug!(
            "Generated depth {} level: {} rooms, {} entities, stairs at {:?}",
            self.depth,
            level.rooms.len(),
            level.entities.len(),
            stairs
        );
        Ok(level)
    }

    fn validate(&self, level: &GeneratedLevel, config: &GenerationConfig) -> DelveResult<()> {
        validate_level(&level.grid)?;
        if let Some(room) = level
            .rooms
            .iter()
            .find(|room| !room.fits(config.map_width, config.map_height))
        {
            return Err(DelveError::GenerationFailed(format!(
                "Room {:?} lies outside the map",
                room
            )));
        }
        validate_connectivity(&level.grid, level.player_spawn)
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

impl Default for RoomCorridorGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::create_rng;

    #[test]
    fn test_generation_with_small_level() {
        let generator = RoomCorridorGenerator::new(1);
        let config = GenerationConfig::for_testing(12345);
        let mut rng = create_rng(&config);

        let level = generator.generate(&config, &mut rng).unwrap();
        assert_eq!(level.grid.width, config.map_width);
        assert_eq!(level.grid.height, config.map_height);
        assert!(!level.rooms.is_empty());
        assert!(level.grid.is_walkable(level.player_spawn));
        assert_eq!(
            level.grid.tile(level.stairs.unwrap()),
            Some(TileKind::DownStairs)
        );
        assert_eq!(generator.generator_type(), "RoomCorridorGenerator");
    }

    #[test]
    fn test_entities_on_distinct_free_floor() {
        let generator = RoomCorridorGenerator::new(1);
        let mut config = GenerationConfig::new(777);
        config.max_monsters_per_room = 3;
        config.max_items_per_room = 3;
        let level = generator.generate(&config, &mut create_rng(&config)).unwrap();

        let mut seen = HashSet::new();
        for entity in &level.entities {
            assert!(level.grid.is_walkable(entity.position));
            assert_ne!(entity.position, level.player_spawn);
            assert!(seen.insert(entity.position));
            assert!(level.rooms.iter().any(|r| r.floor_positions().contains(&entity.position)));
        }
    }

    #[test]
    fn test_l_corridor_carving() {
        let generator = RoomCorridorGenerator::new(1);
        let mut grid = Grid::new(20, 20, TileKind::Wall);

        let start = Position::new(5, 5);
        let end = Position::new(15, 12);
        generator.carve_l_corridor(&mut grid, start, end, true).unwrap();

        assert_eq!(grid.tile(start), Some(TileKind::Floor));
        assert_eq!(grid.tile(end), Some(TileKind::Floor));
        assert_eq!(grid.tile(Position::new(15, 5)), Some(TileKind::Floor));
        assert_eq!(grid.tile(Position::new(5, 12)), Some(TileKind::Wall));
        assert_eq!(grid.walkable_count(), 11 + 7);

        let mut grid = Grid::new(20, 20, TileKind::Wall);
        generator.carve_l_corridor(&mut grid, start, end, false).unwrap();
        assert_eq!(grid.tile(Position::new(5, 12)), Some(TileKind::Floor));
        assert_eq!(grid.tile(Position::new(15, 5)), Some(TileKind::Wall));
    }

    #[test]
    fn test_forced_room_when_none_placed() {
        let mut config = GenerationConfig::for_testing(5);
        config.max_rooms = 0;
        let level = RoomCorridorGenerator::new(1)
            .generate(&config, &mut create_rng(&config))
            .unwrap();

        assert_eq!(level.rooms.len(), 1);
        assert!(level.grid.is_walkable(level.player_spawn));
        assert_ne!(level.stairs, Some(level.player_spawn));
    }

    #[test]
    fn test_single_tiny_room_keeps_stairs_on_spawn() {
        let mut config = GenerationConfig::for_testing(5);
        config.max_rooms = 1;
        config.room_min_size = 3;
        config.room_max_size = 3;
        let level = RoomCorridorGenerator::new(1)
            .generate(&config, &mut create_rng(&config))
            .unwrap();

        assert_eq!(level.grid.walkable_count(), 1);
        assert_eq!(level.stairs, Some(level.player_spawn));
    }

    #[test]
    fn test_deeper_levels_can_spawn_trolls() {
        let mut config = GenerationConfig::new(31);
        config.max_monsters_per_room = 3;
        let shallow = RoomCorridorGenerator::new(1)
            .generate(&config, &mut create_rng(&config))
            .unwrap();
        assert!(shallow.entities.iter().all(|e| e.name != "Troll"));

        let deep = (0..20u64)
            .map(|seed| {
                let config = GenerationConfig {
                    seed,
                    ..config.clone()
                };
                RoomCorridorGenerator::new(8)
                    .generate(&config, &mut create_rng(&config))
                    .unwrap()
            })
            .flat_map(|level| level.entities)
            .any(|e| e.name == "Troll");
        assert!(deep);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GenerationConfig::for_testing(1);
        config.room_min_size = 10;
        config.room_max_size = 5;
        let result = RoomCorridorGenerator::new(1).generate(&config, &mut create_rng(&config));
        assert!(matches!(result, Err(DelveError::InvalidConfig(_))));
    }
}
