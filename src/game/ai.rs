//! # Monster AI
//!
//! Each monster carries an [`AiPolicy`] value. Confusion wraps the current
//! policy and hands it back when the countdown runs out, so swapping and
//! restoring behavior is plain value assignment.

use crate::game::{
    Action, BumpAction, Direction, EntityId, GameState, MeleeAction, MessageColor, MoveAction,
};
use crate::utils::find_path;
use crate::{DelveError, DelveResult};
use log::trace;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiPolicy {
    /// Chases and attacks the player while it is in view, idles otherwise.
    Hostile,
    /// Stumbles randomly, then reverts to `previous`.
    Confused {
        turns_remaining: u32,
        previous: Box<AiPolicy>,
    },
}

impl AiPolicy {
    /// Wraps this policy in a confusion lasting `turns` turns.
    pub fn confused(self, turns: u32) -> Self {
        AiPolicy::Confused {
            turns_remaining: turns,
            previous: Box::new(self),
        }
    }

    pub fn is_confused(&self) -> bool {
        matches!(self, AiPolicy::Confused { .. })
    }
}

/// Chooses and performs one turn for the monster `actor_id`.
///
/// Impossible results are returned to the caller, which is expected to
/// discard them.
pub fn take_turn(state: &mut GameState, actor_id: EntityId) -> DelveResult<()> {
    let policy = state
        .entity(actor_id)?
        .ai
        .clone()
        .ok_or_else(|| DelveError::InvalidState(format!("Entity {} has no AI", actor_id)))?;

    match policy {
        AiPolicy::Hostile => hostile_turn(state, actor_id),
        AiPolicy::Confused {
            turns_remaining,
            previous,
        } => confused_turn(state, actor_id, turns_remaining, *previous),
    }
}

fn hostile_turn(state: &mut GameState, actor_id: EntityId) -> DelveResult<()> {
    let player = state.player()?;
    if !player.is_alive() {
        return Ok(());
    }
    let target = player.position;
    let position = state.entity(actor_id)?.position;

    // The player's view doubles as the monster's: if the player can see the
    // monster's tile, the monster can see the player.
    if !state.grid.is_visible(position) {
        trace!("{} idles out of view", actor_id);
        return Ok(());
    }

    let delta = target - position;
    if position.chebyshev_distance(target) <= 1 {
        return MeleeAction::new(actor_id, delta.x, delta.y).perform(state);
    }

    let occupied: HashSet<_> = state
        .entities
        .values()
        .filter(|e| e.blocks_movement && e.id != actor_id)
        .map(|e| e.position)
        .collect();

    match find_path(&state.grid, &occupied, position, target).and_then(|path| path.first().copied()) {
        Some(next) => {
            let step = next - position;
            trace!("{} steps toward the player", actor_id);
            MoveAction::new(actor_id, step.x, step.y).perform(state)
        }
        None => Ok(()),
    }
}

fn confused_turn(
    state: &mut GameState,
    actor_id: EntityId,
    turns_remaining: u32,
    previous: AiPolicy,
) -> DelveResult<()> {
    let remaining = turns_remaining.saturating_sub(1);

    let result = if turns_remaining == 0 {
        Ok(())
    } else {
        let directions = Direction::all();
        let direction = *directions
            .choose(&mut state.rng)
            .ok_or_else(|| DelveError::InvalidState("no directions to stumble in".to_string()))?;
        let delta = direction.to_delta();
        trace!("{} stumbles {:?}", actor_id, direction);
        BumpAction::new(actor_id, delta.x, delta.y).perform(state)
    };

    let actor = state.entity_mut(actor_id)?;
    if !actor.is_alive() {
        return result;
    }
    if remaining == 0 {
        actor.ai = Some(previous);
        let name = actor.name.clone();
        state
            .messages
            .add(format!("The {} is no longer confused.", name), MessageColor::StatusEffect);
    } else {
        actor.ai = Some(AiPolicy::Confused {
            turns_remaining: remaining,
            previous: Box::new(previous),
        });
    }

    result
}
