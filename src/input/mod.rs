//! # Input Module
//!
//! Turns already-decoded player intents into actions. Raw device events are
//! the caller's business; scripted play goes through [`commands`].

pub mod commands;

pub use commands::*;

use crate::game::{
    BumpAction, ConcreteAction, DescendAction, Direction, DropAction, EntityId, EquipAction, GameState,
    PickupAction, Position, Targeting, UseItemAction, WaitAction,
};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// Player input types that can be processed by the input handler.
///
/// Inventory slots are zero-based indices into the player's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    /// Step (or attack) in a direction given as a relative position
    Move(Position),
    /// Wait/rest for one turn
    Wait,
    /// Pick up item at current position
    Pickup,
    Drop(usize),
    /// Use an item, with a target point for items that need one
    Use { slot: usize, target: Option<Position> },
    /// Equip or unequip an item
    Equip(usize),
    /// Take the stairs down
    Descend,
}

/// Converts player inputs into concrete actions for the current state.
#[derive(Debug, Clone, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Action, GameConfig, GameState, InputHandler, PlayerInput, Position};
    ///
    /// let state = GameState::new_game(GameConfig::for_testing(1)).unwrap();
    /// let action = InputHandler::new()
    ///     .input_to_action(PlayerInput::Move(Position::new(1, 0)), &state)
    ///     .unwrap();
    /// assert_eq!(action.actor(), state.player_id);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Converts player input to a concrete game action.
    ///
    /// Movement becomes a bump, so walking into a monster attacks it. A slot
    /// that holds nothing is [`DelveError::Impossible`].
    pub fn input_to_action(&self, input: PlayerInput, state: &GameState) -> DelveResult<ConcreteAction> {
        let player = state.player_id;
        let action = match input {
            PlayerInput::Move(delta) => {
                let direction = Direction::from_delta(delta).ok_or_else(|| {
                    DelveError::InvalidCommand(format!("Invalid movement direction {:?}", delta))
                })?;
                let step = direction.to_delta();
                BumpAction::new(player, step.x, step.y).into()
            }
            PlayerInput::Wait => WaitAction::new(player).into(),
            PlayerInput::Pickup => PickupAction::new(player).into(),
            PlayerInput::Drop(slot) => DropAction::new(player, self.item_in_slot(state, slot)?).into(),
            PlayerInput::Use { slot, target } => {
                UseItemAction::new(player, self.item_in_slot(state, slot)?, target).into()
            }
            PlayerInput::Equip(slot) => EquipAction::new(player, self.item_in_slot(state, slot)?).into(),
            PlayerInput::Descend => DescendAction::new(player).into(),
        };
        Ok(action)
    }

    /// What the item in `slot` needs from the player before it can be used.
    /// `None` for empty slots and items that cannot be used.
    pub fn targeting_for(&self, state: &GameState, slot: usize) -> Option<Targeting> {
        state
            .player()
            .ok()?
            .inventory
            .as_ref()?
            .items
            .get(slot)?
            .consumable
            .as_ref()
            .map(|consumable| consumable.targeting())
    }

    fn item_in_slot(&self, state: &GameState, slot: usize) -> DelveResult<EntityId> {
        state
            .player()?
            .inventory
            .as_ref()
            .and_then(|inventory| inventory.items.get(slot))
            .map(|item| item.id)
            .ok_or_else(|| DelveError::Impossible("Invalid entry.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Action, Grid, TileKind};
    use crate::generation::items;

    fn state_with_potion() -> GameState {
        let mut grid = Grid::new(10, 10, TileKind::Wall);
        for y in 1..9 {
            for x in 1..9 {
                grid.set_tile(Position::new(x, y), TileKind::Floor).unwrap();
            }
        }
        let mut state = GameState::with_grid(grid, Position::new(4, 4), GameConfig::for_testing(1)).unwrap();
        let player_id = state.player_id;
        let potion = items::health_potion().spawn(crate::game::new_entity_id(), Position::new(4, 4));
        let _ = state
            .entity_mut(player_id)
            .unwrap()
            .inventory
            .as_mut()
            .unwrap()
            .add(potion);
        state
    }

    #[test]
    fn test_move_becomes_bump() {
        let state = state_with_potion();
        let handler = InputHandler::new();
        let action = handler
            .input_to_action(PlayerInput::Move(Position::new(1, 0)), &state)
            .unwrap();
        assert!(matches!(action, ConcreteAction::Bump(_)));
        assert_eq!(action.actor(), state.player_id);

        assert!(handler
            .input_to_action(PlayerInput::Move(Position::new(2, 0)), &state)
            .is_err());
    }

    #[test]
    fn test_slot_lookup() {
        let state = state_with_potion();
        let handler = InputHandler::new();

        let action = handler
            .input_to_action(PlayerInput::Use { slot: 0, target: None }, &state)
            .unwrap();
        assert!(matches!(action, ConcreteAction::UseItem(_)));

        let missing = handler.input_to_action(PlayerInput::Drop(3), &state);
        assert!(missing.unwrap_err().is_impossible());
    }

    #[test]
    fn test_targeting_for_slot() {
        let state = state_with_potion();
        let handler = InputHandler::new();
        assert_eq!(handler.targeting_for(&state, 0), Some(Targeting::SelfOnly));
        assert_eq!(handler.targeting_for(&state, 1), None);
    }
}
