//! # Action System
//!
//! Every intent, from the player or a monster, is an action. `perform`
//! validates against the current state and either applies the whole effect or
//! returns [`DelveError::Impossible`] having changed nothing.
//!
//! Actions are plain serializable values so they can be queued, logged or
//! driven from scripts.

use crate::game::{Direction, EntityId, GameState, MessageColor, Position, TileKind};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// Common interface for all actions.
pub trait Action {
    /// Applies the action or rejects it without side effects.
    fn perform(&self, state: &mut GameState) -> DelveResult<()>;

    /// The entity carrying out the action.
    fn actor(&self) -> EntityId;
}

fn impossible<T>(reason: &str) -> DelveResult<T> {
    Err(DelveError::Impossible(reason.to_string()))
}

/// Rejects actions from missing or dead actors.
fn require_living(state: &GameState, actor: EntityId) -> DelveResult<Position> {
    let entity = state.entity(actor)?;
    if !entity.is_alive() {
        return impossible("The dead cannot act.");
    }
    Ok(entity.position)
}

/// The tile one step from a living actor. Offsets beyond the eight
/// neighbours are rejected.
fn step_destination(state: &GameState, actor: EntityId, dx: i32, dy: i32) -> DelveResult<Position> {
    let origin = require_living(state, actor)?;
    if Direction::from_delta(Position::new(dx, dy)).is_none() {
        return impossible("You can only move one step at a time.");
    }
    Ok(origin.offset(dx, dy))
}

/// Steps one tile in a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAction {
    pub actor: EntityId,
    pub dx: i32,
    pub dy: i32,
}

impl MoveAction {
    pub fn new(actor: EntityId, dx: i32, dy: i32) -> Self {
        Self { actor, dx, dy }
    }
}

impl Action for MoveAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        let destination = step_destination(state, self.actor, self.dx, self.dy)?;

        if !state.grid.in_bounds(destination) || !state.grid.is_walkable(destination) {
            return impossible("That way is blocked.");
        }
        if state.blocking_entity_at(destination).is_some() {
            return impossible("That way is blocked.");
        }

        state.entity_mut(self.actor)?.position = destination;
        Ok(())
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Attacks whatever blocking entity stands in a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeleeAction {
    pub actor: EntityId,
    pub dx: i32,
    pub dy: i32,
}

impl MeleeAction {
    pub fn new(actor: EntityId, dx: i32, dy: i32) -> Self {
        Self { actor, dx, dy }
    }
}

impl Action for MeleeAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        let destination = step_destination(state, self.actor, self.dx, self.dy)?;

        let target_id = match state.blocking_entity_at(destination) {
            Some(id) if id != self.actor => id,
            _ => return impossible("Nothing to attack."),
        };
        let target = state.entity(target_id)?;
        if target.fighter.is_none() {
            return impossible("Nothing to attack.");
        }

        let attacker = state.entity(self.actor)?;
        let damage = (attacker.power() - target.defense()).max(0);
        let description = format!("{} attacks {}", attacker.name, target.name);
        let color = if self.actor == state.player_id {
            MessageColor::PlayerAttack
        } else {
            MessageColor::EnemyAttack
        };

        if damage > 0 {
            state
                .messages
                .add(format!("{} for {} hit points.", description, damage), color);
            state.apply_damage(target_id, damage, Some(self.actor))
        } else {
            state
                .messages
                .add(format!("{} but does no damage.", description), color);
            Ok(())
        }
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Directional intent: attack if something blocks the way, else move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpAction {
    pub actor: EntityId,
    pub dx: i32,
    pub dy: i32,
}

impl BumpAction {
    pub fn new(actor: EntityId, dx: i32, dy: i32) -> Self {
        Self { actor, dx, dy }
    }
}

impl Action for BumpAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        let destination = step_destination(state, self.actor, self.dx, self.dy)?;

        if state.actor_at(destination).is_some() {
            MeleeAction::new(self.actor, self.dx, self.dy).perform(state)
        } else {
            MoveAction::new(self.actor, self.dx, self.dy).perform(state)
        }
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Picks up an item from the actor's tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupAction {
    pub actor: EntityId,
}

impl PickupAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }
}

impl Action for PickupAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        let position = require_living(state, self.actor)?;

        let item_id = state
            .items_at(position)
            .first()
            .copied()
            .ok_or_else(|| DelveError::Impossible("There is nothing here to pick up.".to_string()))?;

        let inventory = state
            .entity(self.actor)?
            .inventory
            .as_ref()
            .ok_or_else(|| DelveError::Impossible("You cannot carry anything.".to_string()))?;
        if inventory.is_full() {
            return impossible("Your inventory is full.");
        }

        let item = state.remove_entity(item_id)?;
        let name = item.name.clone();
        let inventory = state
            .entity_mut(self.actor)?
            .inventory
            .as_mut()
            .ok_or_else(|| DelveError::InvalidState("inventory vanished during pickup".to_string()))?;
        if inventory.add(item).is_err() {
            return Err(DelveError::InvalidState("inventory filled during pickup".to_string()));
        }

        state
            .messages
            .add(format!("You picked up the {}!", name), MessageColor::Default);
        Ok(())
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Drops a carried item onto the actor's tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropAction {
    pub actor: EntityId,
    pub item: EntityId,
}

impl DropAction {
    pub fn new(actor: EntityId, item: EntityId) -> Self {
        Self { actor, item }
    }
}

impl Action for DropAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        let position = require_living(state, self.actor)?;
        state.inventory_item(self.actor, self.item)?;
        let was_equipped = state.entity(self.actor)?.is_equipped(self.item);

        let mut item = state.remove_from_inventory(self.actor, self.item)?;
        item.position = position;
        let name = item.name.clone();
        state.add_entity(item);

        if was_equipped {
            state
                .messages
                .add(format!("You remove the {}.", name), MessageColor::Default);
        }
        state
            .messages
            .add(format!("You dropped the {}.", name), MessageColor::Default);
        Ok(())
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Activates a carried consumable, optionally at a target point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseItemAction {
    pub actor: EntityId,
    pub item: EntityId,
    pub target: Option<Position>,
}

impl UseItemAction {
    pub fn new(actor: EntityId, item: EntityId, target: Option<Position>) -> Self {
        Self { actor, item, target }
    }
}

impl Action for UseItemAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        require_living(state, self.actor)?;
        let item = state.inventory_item(self.actor, self.item)?;
        let consumable = match &item.consumable {
            Some(consumable) => consumable.clone(),
            None => return impossible(&format!("The {} cannot be used.", item.name)),
        };

        consumable.activate(state, self.actor, self.item, self.target)
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Equips a carried item, or unequips it if it is already worn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipAction {
    pub actor: EntityId,
    pub item: EntityId,
}

impl EquipAction {
    pub fn new(actor: EntityId, item: EntityId) -> Self {
        Self { actor, item }
    }
}

impl Action for EquipAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        require_living(state, self.actor)?;
        let item = state.inventory_item(self.actor, self.item)?;
        let slot = match &item.equippable {
            Some(equippable) => equippable.slot,
            None => return impossible(&format!("The {} cannot be equipped.", item.name)),
        };
        let item_name = item.name.clone();

        let actor = state.entity(self.actor)?;
        let equipment = actor
            .equipment
            .as_ref()
            .ok_or_else(|| DelveError::Impossible("You cannot equip anything.".to_string()))?;

        let mut notes = Vec::new();
        let new_item = if equipment.get(slot) == Some(self.item) {
            notes.push(format!("You remove the {}.", item_name));
            None
        } else {
            if let Some(current) = equipment.get(slot) {
                let current_name = state.inventory_item(self.actor, current)?.name.clone();
                notes.push(format!("You remove the {}.", current_name));
            }
            notes.push(format!("You equip the {}.", item_name));
            Some(self.item)
        };

        if let Some(equipment) = state.entity_mut(self.actor)?.equipment.as_mut() {
            equipment.set(slot, new_item);
        }
        for note in notes {
            state.messages.add(note, MessageColor::Default);
        }
        Ok(())
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Passes the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitAction {
    pub actor: EntityId,
}

impl WaitAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }
}

impl Action for WaitAction {
    fn perform(&self, _state: &mut GameState) -> DelveResult<()> {
        Ok(())
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Takes the stairs down to a freshly generated level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescendAction {
    pub actor: EntityId,
}

impl DescendAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }
}

impl Action for DescendAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        let position = require_living(state, self.actor)?;
        if state.grid.tile(position) != Some(TileKind::DownStairs) {
            return impossible("There are no stairs here.");
        }
        if self.actor != state.player_id {
            return impossible("Only the player can take the stairs.");
        }

        state.descend()
    }

    fn actor(&self) -> EntityId {
        self.actor
    }
}

/// Closed set of all actions, dispatched with a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteAction {
    Move(MoveAction),
    Melee(MeleeAction),
    Bump(BumpAction),
    Pickup(PickupAction),
    Drop(DropAction),
    UseItem(UseItemAction),
    Equip(EquipAction),
    Wait(WaitAction),
    Descend(DescendAction),
}

impl Action for ConcreteAction {
    fn perform(&self, state: &mut GameState) -> DelveResult<()> {
        match self {
            ConcreteAction::Move(action) => action.perform(state),
            ConcreteAction::Melee(action) => action.perform(state),
            ConcreteAction::Bump(action) => action.perform(state),
            ConcreteAction::Pickup(action) => action.perform(state),
            ConcreteAction::Drop(action) => action.perform(state),
            ConcreteAction::UseItem(action) => action.perform(state),
            ConcreteAction::Equip(action) => action.perform(state),
            ConcreteAction::Wait(action) => action.perform(state),
            ConcreteAction::Descend(action) => action.perform(state),
        }
    }

    fn actor(&self) -> EntityId {
        match self {
            ConcreteAction::Move(action) => action.actor(),
            ConcreteAction::Melee(action) => action.actor(),
            ConcreteAction::Bump(action) => action.actor(),
            ConcreteAction::Pickup(action) => action.actor(),
            ConcreteAction::Drop(action) => action.actor(),
            ConcreteAction::UseItem(action) => action.actor(),
            ConcreteAction::Equip(action) => action.actor(),
            ConcreteAction::Wait(action) => action.actor(),
            ConcreteAction::Descend(action) => action.actor(),
        }
    }
}

macro_rules! impl_from_action {
    ($($variant:ident => $action:ty),* $(,)?) => {
        $(
            impl From<$action> for ConcreteAction {
                fn from(action: $action) -> Self {
                    ConcreteAction::$variant(action)
                }
            }
        )*
    };
}

impl_from_action! {
    Move => MoveAction,
    Melee => MeleeAction,
    Bump => BumpAction,
    Pickup => PickupAction,
    Drop => DropAction,
    UseItem => UseItemAction,
    Equip => EquipAction,
    Wait => WaitAction,
    Descend => DescendAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{new_entity_id, EquipmentSlot, Grid};
    use crate::generation::{encounters, items};

    fn open_state() -> GameState {
        let mut grid = Grid::new(12, 12, TileKind::Wall);
        for y in 1..11 {
            for x in 1..11 {
                grid.set_tile(Position::new(x, y), TileKind::Floor).unwrap();
            }
        }
        GameState::with_grid(grid, Position::new(5, 5), GameConfig::for_testing(1)).unwrap()
    }

    fn carry(state: &mut GameState, item: crate::game::Entity) -> EntityId {
        let player_id = state.player_id;
        let id = item.id;
        state
            .entity_mut(player_id)
            .unwrap()
            .inventory
            .as_mut()
            .unwrap()
            .add(item)
            .unwrap();
        id
    }

    #[test]
    fn test_blocked_move_changes_nothing() {
        let mut state = open_state();
        let player_id = state.player_id;
        state.entity_mut(player_id).unwrap().position = Position::new(1, 1);

        let result = ConcreteAction::from(MoveAction::new(player_id, -1, 0)).perform(&mut state);
        assert!(result.unwrap_err().is_impossible());
        assert_eq!(state.player().unwrap().position, Position::new(1, 1));
    }

    #[test]
    fn test_only_single_steps_are_allowed() {
        let mut state = open_state();
        let player_id = state.player_id;
        state.grid.set_tile(Position::new(6, 5), TileKind::Wall).unwrap();
        let orc_id = state.add_entity(encounters::orc().spawn(new_entity_id(), Position::new(9, 5)));

        let leap = MoveAction::new(player_id, 3, 0).perform(&mut state);
        assert!(leap.unwrap_err().is_impossible());
        assert_eq!(state.player().unwrap().position, Position::new(5, 5));

        let reach = MeleeAction::new(player_id, 4, 0).perform(&mut state);
        assert!(reach.unwrap_err().is_impossible());
        assert_eq!(state.entity(orc_id).unwrap().fighter.as_ref().unwrap().hp, 10);

        let stand_still = BumpAction::new(player_id, 0, 0).perform(&mut state);
        assert!(stand_still.unwrap_err().is_impossible());
    }

    #[test]
    fn test_bump_attacks_or_moves() {
        let mut state = open_state();
        let player_id = state.player_id;
        let orc_id = state.add_entity(encounters::orc().spawn(new_entity_id(), Position::new(6, 5)));

        BumpAction::new(player_id, 1, 0).perform(&mut state).unwrap();
        assert_eq!(state.player().unwrap().position, Position::new(5, 5));
        assert_eq!(state.entity(orc_id).unwrap().fighter.as_ref().unwrap().hp, 10 - 4);

        BumpAction::new(player_id, 0, 1).perform(&mut state).unwrap();
        assert_eq!(state.player().unwrap().position, Position::new(5, 6));
    }

    #[test]
    fn test_equip_replaces_then_toggles_off() {
        let mut state = open_state();
        let player_id = state.player_id;
        let sword = carry(&mut state, items::sword().spawn(new_entity_id(), Position::new(5, 5)));

        EquipAction::new(player_id, sword).perform(&mut state).unwrap();
        let player = state.player().unwrap();
        assert_eq!(player.equipment.as_ref().unwrap().get(EquipmentSlot::Weapon), Some(sword));
        assert_eq!(player.power(), 2 + 4);
        assert_eq!(state.messages.last().unwrap().text, "You equip the Sword.");

        EquipAction::new(player_id, sword).perform(&mut state).unwrap();
        let player = state.player().unwrap();
        assert_eq!(player.equipment.as_ref().unwrap().get(EquipmentSlot::Weapon), None);
        assert_eq!(player.power(), 2);
    }

    #[test]
    fn test_dropping_equipped_item_unequips() {
        let mut state = open_state();
        let player_id = state.player_id;
        let dagger = state
            .player()
            .unwrap()
            .equipment
            .as_ref()
            .unwrap()
            .get(EquipmentSlot::Weapon)
            .unwrap();

        DropAction::new(player_id, dagger).perform(&mut state).unwrap();
        assert_eq!(state.player().unwrap().power(), 2);
        assert_eq!(state.items_at(Position::new(5, 5)), vec![dagger]);
        assert_eq!(state.messages.last().unwrap().text, "You dropped the Dagger.");
    }

    #[test]
    fn test_unusable_item_is_rejected() {
        let mut state = open_state();
        let player_id = state.player_id;
        let sword = carry(&mut state, items::sword().spawn(new_entity_id(), Position::new(5, 5)));

        let result = UseItemAction::new(player_id, sword, None).perform(&mut state);
        assert_eq!(result.unwrap_err().to_string(), "The Sword cannot be used.");
    }

    #[test]
    fn test_dead_actor_cannot_act() {
        let mut state = open_state();
        let orc_id = state.add_entity(encounters::orc().spawn(new_entity_id(), Position::new(7, 7)));
        state.apply_damage(orc_id, 100, None).unwrap();

        let result = MoveAction::new(orc_id, 1, 0).perform(&mut state);
        assert!(result.unwrap_err().is_impossible());
        assert!(WaitAction::new(state.player_id).perform(&mut state).is_ok());
    }
}
