//! # Engine
//!
//! Sequences turns. A turn is the player's action, then every monster's
//! action, then a visibility refresh, always in that order.

use crate::config::GameConfig;
use crate::game::{ai, Action, ConcreteAction, EntityId, GameState, MessageColor};
use crate::input::{InputHandler, PlayerInput};
use crate::{DelveError, DelveResult};
use log::{debug, info, trace};
use std::path::Path;

/// What happened when the engine was asked to advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The turn ran to completion
    Completed,
    /// The player's action was impossible; no time passed
    Rejected(String),
    /// The turn completed and the player did not survive it
    PlayerDied,
}

/// Owns the game state for a session and drives it turn by turn.
#[derive(Debug, Clone)]
pub struct Engine {
    pub state: GameState,
    input_handler: InputHandler,
}

impl Engine {
    /// Starts a new game from configuration.
    pub fn new(config: GameConfig) -> DelveResult<Self> {
        Ok(Self::from_state(GameState::new_game(config)?))
    }

    /// Wraps an existing state, e.g. one restored from a save.
    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            input_handler: InputHandler::new(),
        }
    }

    pub fn player_id(&self) -> EntityId {
        self.state.player_id
    }

    /// Runs one turn starting with the player's `action`.
    ///
    /// An impossible player action is logged and returned as
    /// [`TurnOutcome::Rejected`] without any monster acting. Any other error
    /// aborts the turn and propagates.
    pub fn advance(&mut self, action: ConcreteAction) -> DelveResult<TurnOutcome> {
        if action.actor() != self.state.player_id {
            return Err(DelveError::InvalidState(
                "advance expects an action performed by the player".to_string(),
            ));
        }
        if !self.state.is_player_alive() {
            return Ok(self.reject("You are dead.".to_string()));
        }

        match action.perform(&mut self.state) {
            Ok(()) => {}
            Err(DelveError::Impossible(reason)) => return Ok(self.reject(reason)),
            Err(e) => return Err(e),
        }

        self.handle_enemy_turns()?;
        self.state.update_fov()?;
        self.state.turn_number += 1;
        debug!("Turn {} complete", self.state.turn_number);

        if self.state.is_player_alive() {
            Ok(TurnOutcome::Completed)
        } else {
            Ok(TurnOutcome::PlayerDied)
        }
    }

    /// Converts a decoded input into an action and advances with it.
    pub fn handle_input(&mut self, input: PlayerInput) -> DelveResult<TurnOutcome> {
        match self.input_handler.input_to_action(input, &self.state) {
            Ok(action) => self.advance(action),
            Err(DelveError::Impossible(reason)) => Ok(self.reject(reason)),
            Err(e) => Err(e),
        }
    }

    fn reject(&mut self, reason: String) -> TurnOutcome {
        self.state.messages.add(reason.clone(), MessageColor::Impossible);
        TurnOutcome::Rejected(reason)
    }

    /// Lets every monster with an AI act once. Their impossible actions are
    /// dropped silently.
    fn handle_enemy_turns(&mut self) -> DelveResult<()> {
        let actors: Vec<EntityId> = self
            .state
            .entities
            .values()
            .filter(|e| e.id != self.state.player_id && e.ai.is_some())
            .map(|e| e.id)
            .collect();

        for actor_id in actors {
            let still_acting = self
                .state
                .entities
                .get(&actor_id)
                .map(|e| e.is_alive() && e.ai.is_some())
                .unwrap_or(false);
            if !still_acting {
                continue;
            }

            match ai::take_turn(&mut self.state, actor_id) {
                Ok(()) => {}
                Err(DelveError::Impossible(reason)) => trace!("{} fumbled: {}", actor_id, reason),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Serializes the whole game state into one byte blob.
    pub fn save_to_bytes(&self) -> DelveResult<Vec<u8>> {
        serde_json::to_vec(&self.state).map_err(DelveError::from)
    }

    /// Restores an engine from [`Engine::save_to_bytes`] output.
    ///
    /// Saves whose map layers disagree with the recorded dimensions are
    /// rejected as [`DelveError::InvalidState`].
    pub fn load_from_bytes(bytes: &[u8]) -> DelveResult<Self> {
        let state: GameState = serde_json::from_slice(bytes)?;
        state.grid.check_layers()?;
        Ok(Self::from_state(state))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> DelveResult<()> {
        let bytes = self.save_to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        info!("Saved game to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> DelveResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        info!("Loaded game from {}", path.as_ref().display());
        Self::load_from_bytes(&bytes)
    }
}
