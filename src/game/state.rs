//! # Game State Module
//!
//! The single owned aggregate holding everything the simulation needs: the
//! grid, every entity on the current level, the player reference, the message
//! log, the configuration and the random stream.
//!
//! Nothing lives in globals. Every operation receives the state explicitly,
//! and saving the game is serializing this struct.

use crate::config::GameConfig;
use crate::game::{
    seeded_entity_id, Entity, EntityId, EquipmentSlot, Grid, MessageColor, MessageLog, Position,
};
use crate::generation::{items, GameRng, GeneratedLevel, Generator, RoomCorridorGenerator};
use crate::{DelveError, DelveResult};
use log::{debug, info};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Central game state containing all simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Tiles plus the visible/explored layers of the current level
    pub grid: Grid,
    /// Entities on the current level, ordered by id for deterministic turns.
    /// Carried items live inside their owner's inventory, not here.
    pub entities: BTreeMap<EntityId, Entity>,
    pub player_id: EntityId,
    pub messages: MessageLog,
    /// Dungeon depth, starting at 1
    pub depth: u32,
    /// Completed turns
    pub turn_number: u64,
    pub config: GameConfig,
    pub rng: GameRng,
}

impl GameState {
    /// Starts a new game: generates the first level and places an outfitted player.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GameConfig, GameState};
    ///
    /// let state = GameState::new_game(GameConfig::for_testing(12345)).unwrap();
    /// assert_eq!(state.depth, 1);
    /// assert_eq!(state.turn_number, 0);
    /// assert!(state.player().unwrap().is_alive());
    /// ```
    pub fn new_game(config: GameConfig) -> DelveResult<Self> {
        config.validate()?;
        let mut rng = GameRng::seed_from_u64(config.generation.seed);
        let level = RoomCorridorGenerator::new(1).generate(&config.generation, &mut rng)?;
        let player = outfitted_player(&mut rng)?;

        let mut state = Self::from_level(level, player, config, rng);
        state.messages.add(
            "Hello and welcome, adventurer, to yet another dungeon!",
            MessageColor::Welcome,
        );
        state.update_fov()?;
        info!("New game started with seed {}", state.config.generation.seed);
        Ok(state)
    }

    /// Builds a state around a hand-made grid with an unequipped player.
    ///
    /// Useful for scenarios and tests that need exact layouts.
    pub fn with_grid(grid: Grid, player_position: Position, config: GameConfig) -> DelveResult<Self> {
        let mut rng = GameRng::seed_from_u64(config.generation.seed);
        let player = Entity::player().spawn(seeded_entity_id(&mut rng), player_position);
        let level = GeneratedLevel {
            grid,
            player_spawn: player_position,
            stairs: None,
            entities: Vec::new(),
            rooms: Vec::new(),
        };
        let mut state = Self::from_level(level, player, config, rng);
        state.update_fov()?;
        Ok(state)
    }

    fn from_level(level: GeneratedLevel, mut player: Entity, config: GameConfig, rng: GameRng) -> Self {
        player.position = level.player_spawn;
        let player_id = player.id;

        let mut entities: BTreeMap<EntityId, Entity> =
            level.entities.into_iter().map(|e| (e.id, e)).collect();
        entities.insert(player_id, player);

        Self {
            grid: level.grid,
            entities,
            player_id,
            messages: MessageLog::new(config.message_log_capacity),
            depth: 1,
            turn_number: 0,
            config,
            rng,
        }
    }

    /// Looks up an entity on the current level.
    pub fn entity(&self, id: EntityId) -> DelveResult<&Entity> {
        self.entities
            .get(&id)
            .ok_or_else(|| DelveError::InvalidState(format!("Entity {} not found", id)))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> DelveResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| DelveError::InvalidState(format!("Entity {} not found", id)))
    }

    pub fn player(&self) -> DelveResult<&Entity> {
        self.entity(self.player_id)
    }

    pub fn is_player_alive(&self) -> bool {
        self.player().map(Entity::is_alive).unwrap_or(false)
    }

    /// Places an entity on the level, returning its id.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.insert(id, entity);
        id
    }

    pub fn remove_entity(&mut self, id: EntityId) -> DelveResult<Entity> {
        self.entities
            .remove(&id)
            .ok_or_else(|| DelveError::InvalidState(format!("Entity {} not found", id)))
    }

    /// The entity blocking movement at a position, if any.
    pub fn blocking_entity_at(&self, pos: Position) -> Option<EntityId> {
        self.entities
            .values()
            .find(|e| e.blocks_movement && e.position == pos)
            .map(|e| e.id)
    }

    /// A living actor at a position, if any.
    pub fn actor_at(&self, pos: Position) -> Option<EntityId> {
        self.living_actors().find(|e| e.position == pos).map(|e| e.id)
    }

    /// Items lying on the ground at a position.
    pub fn items_at(&self, pos: Position) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.is_item() && e.position == pos)
            .map(|e| e.id)
            .collect()
    }

    pub fn living_actors(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.is_alive())
    }

    /// Finds an item in an actor's inventory.
    pub fn inventory_item(&self, owner: EntityId, item: EntityId) -> DelveResult<&Entity> {
        self.entity(owner)?
            .inventory
            .as_ref()
            .and_then(|inventory| inventory.get(item))
            .ok_or_else(|| DelveError::Impossible("You do not have that item.".to_string()))
    }

    /// Takes an item out of an inventory, unequipping it first if worn.
    pub fn remove_from_inventory(&mut self, owner: EntityId, item: EntityId) -> DelveResult<Entity> {
        let entity = self.entity_mut(owner)?;
        if let Some(equipment) = entity.equipment.as_mut() {
            if let Some(slot) = equipment.slot_of(item) {
                equipment.set(slot, None);
            }
        }
        entity
            .inventory
            .as_mut()
            .and_then(|inventory| inventory.remove(item))
            .ok_or_else(|| DelveError::Impossible("You do not have that item.".to_string()))
    }

    /// Deals damage to a fighter, running the death transition if it drops to zero.
    pub fn apply_damage(&mut self, target: EntityId, amount: i32, source: Option<EntityId>) -> DelveResult<()> {
        let died = self
            .entity_mut(target)?
            .fighter
            .as_mut()
            .map(|f| f.take_damage(amount))
            .unwrap_or(false);
        if died {
            self.kill(target, source)?;
        }
        Ok(())
    }

    /// Turns `victim` into a corpse and awards its experience to `killer`.
    ///
    /// Does nothing if the victim is already a corpse.
    pub fn kill(&mut self, victim: EntityId, killer: Option<EntityId>) -> DelveResult<()> {
        let entity = self.entity_mut(victim)?;
        let name = entity.name.clone();
        let xp = entity.level.as_ref().map(|l| l.xp_given).unwrap_or(0);
        if !entity.die() {
            return Ok(());
        }

        if victim == self.player_id {
            info!("Player died at depth {}", self.depth);
            self.messages.add("You died!", MessageColor::PlayerDeath);
        } else {
            debug!("{} died", name);
            self.messages.add(format!("{} is dead!", name), MessageColor::EnemyDeath);
        }

        let Some(killer) = killer.filter(|&k| k != victim) else {
            return Ok(());
        };
        let bonus = self.config.level_up;
        let gained = self.entity_mut(killer)?.gain_xp(xp, &bonus);
        if killer == self.player_id && xp > 0 {
            self.messages
                .add(format!("You gain {} experience points.", xp), MessageColor::Default);
            if gained > 0 {
                let level = self
                    .player()?
                    .level
                    .as_ref()
                    .map(|l| l.current_level)
                    .unwrap_or(1);
                self.messages
                    .add(format!("You advance to level {}!", level), MessageColor::Welcome);
            }
        }
        Ok(())
    }

    /// Replaces the level with a freshly generated deeper one, keeping the player.
    pub fn descend(&mut self) -> DelveResult<()> {
        let next_depth = self.depth + 1;
        let level = RoomCorridorGenerator::new(next_depth).generate(&self.config.generation, &mut self.rng)?;

        let mut player = self.remove_entity(self.player_id)?;
        player.position = level.player_spawn;

        self.grid = level.grid;
        self.entities = level.entities.into_iter().map(|e| (e.id, e)).collect();
        self.entities.insert(player.id, player);
        self.depth = next_depth;

        info!("Descended to depth {}", next_depth);
        self.messages.add("You descend the staircase.", MessageColor::Descend);
        Ok(())
    }

    /// Recomputes visibility from the player's position.
    pub fn update_fov(&mut self) -> DelveResult<()> {
        let origin = self.player()?.position;
        self.grid.update_visibility(origin, self.config.fov_radius);
        Ok(())
    }

    /// Visible entities in draw order, bottom layer first.
    pub fn render_entities(&self) -> Vec<&Entity> {
        let mut visible: Vec<&Entity> = self
            .entities
            .values()
            .filter(|e| self.grid.is_visible(e.position))
            .collect();
        visible.sort_by_key(|e| e.render_order);
        visible
    }
}

/// The player prototype carrying and wearing its starting gear.
fn outfitted_player(rng: &mut GameRng) -> DelveResult<Entity> {
    let mut player = Entity::player().spawn(seeded_entity_id(rng), Position::new(0, 0));
    let dagger = items::dagger().spawn(seeded_entity_id(rng), Position::new(0, 0));
    let armor = items::leather_armor().spawn(seeded_entity_id(rng), Position::new(0, 0));
    let (dagger_id, armor_id) = (dagger.id, armor.id);

    let inventory = player
        .inventory
        .as_mut()
        .ok_or_else(|| DelveError::InvalidState("player has no inventory".to_string()))?;
    for item in [dagger, armor] {
        if inventory.add(item).is_err() {
            return Err(DelveError::InvalidState("player inventory too small for starting gear".to_string()));
        }
    }

    if let Some(equipment) = player.equipment.as_mut() {
        equipment.set(EquipmentSlot::Weapon, Some(dagger_id));
        equipment.set(EquipmentSlot::Armor, Some(armor_id));
    }
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TileKind;
    use crate::generation::encounters;

    fn open_state() -> GameState {
        let mut grid = Grid::new(20, 10, TileKind::Wall);
        for y in 1..9 {
            for x in 1..19 {
                grid.set_tile(Position::new(x, y), TileKind::Floor).unwrap();
            }
        }
        GameState::with_grid(grid, Position::new(5, 5), GameConfig::for_testing(1)).unwrap()
    }

    #[test]
    fn test_new_game_outfits_player() {
        let state = GameState::new_game(GameConfig::for_testing(12345)).unwrap();
        let player = state.player().unwrap();
        assert_eq!(player.inventory.as_ref().unwrap().len(), 2);
        assert_eq!(player.power(), 4);
        assert_eq!(player.defense(), 2);
        assert!(state.grid.is_visible(player.position));
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_entity_queries() {
        let mut state = open_state();
        let orc = encounters::orc().spawn(crate::game::new_entity_id(), Position::new(6, 5));
        let orc_id = state.add_entity(orc);
        let potion = items::health_potion().spawn(crate::game::new_entity_id(), Position::new(7, 5));
        let potion_id = state.add_entity(potion);

        assert_eq!(state.blocking_entity_at(Position::new(6, 5)), Some(orc_id));
        assert_eq!(state.actor_at(Position::new(6, 5)), Some(orc_id));
        assert_eq!(state.items_at(Position::new(7, 5)), vec![potion_id]);
        assert!(state.blocking_entity_at(Position::new(7, 5)).is_none());
        assert!(state.entity(crate::game::new_entity_id()).is_err());
    }

    #[test]
    fn test_kill_awards_xp_once() {
        let mut state = open_state();
        let orc = encounters::orc().spawn(crate::game::new_entity_id(), Position::new(6, 5));
        let orc_id = state.add_entity(orc);
        let player_id = state.player_id;

        state.kill(orc_id, Some(player_id)).unwrap();
        state.kill(orc_id, Some(player_id)).unwrap();

        let xp = state.player().unwrap().level.as_ref().unwrap().current_xp;
        assert_eq!(xp, 35);
        assert_eq!(state.entity(orc_id).unwrap().name, "remains of Orc");
        assert!(state.actor_at(Position::new(6, 5)).is_none());
    }

    #[test]
    fn test_render_entities_sorted() {
        let mut state = open_state();
        state.add_entity(items::health_potion().spawn(crate::game::new_entity_id(), Position::new(5, 5)));
        let mut corpse = encounters::orc().spawn(crate::game::new_entity_id(), Position::new(5, 5));
        corpse.die();
        state.add_entity(corpse);

        let order: Vec<_> = state.render_entities().iter().map(|e| e.render_order).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert_eq!(order.len(), 3);
    }
}
