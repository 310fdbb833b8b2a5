//! # Consumables
//!
//! Single-use item effects. Each variant checks its own targeting rules
//! before touching anything, applies its effect, then removes the item from
//! the user's inventory exactly once.

use crate::game::{EntityId, GameState, MessageColor, Position};
use crate::{DelveError, DelveResult};
use log::debug;
use serde::{Deserialize, Serialize};

/// What an item needs from the user before it can be activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Targeting {
    /// Affects the user
    SelfOnly,
    /// Picks the closest visible enemy automatically
    NearestInRange { range: u32 },
    /// Needs a target point; hits everything within the radius
    Area { radius: u32 },
    /// Needs a target point holding one actor
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    Healing { amount: i32 },
    Lightning { damage: i32, max_range: u32 },
    Fireball { damage: i32, radius: u32 },
    Confusion { turns: u32 },
}

impl Consumable {
    pub fn targeting(&self) -> Targeting {
        match self {
            Consumable::Healing { .. } => Targeting::SelfOnly,
            Consumable::Lightning { max_range, .. } => Targeting::NearestInRange { range: *max_range },
            Consumable::Fireball { radius, .. } => Targeting::Area { radius: *radius },
            Consumable::Confusion { .. } => Targeting::Single,
        }
    }

    /// Applies the effect of `item_id`, held by `consumer`.
    ///
    /// Fails with [`DelveError::Impossible`] and leaves the state untouched
    /// when the targeting rules are not met.
    pub fn activate(
        &self,
        state: &mut GameState,
        consumer: EntityId,
        item_id: EntityId,
        target: Option<Position>,
    ) -> DelveResult<()> {
        debug!("{} activates {:?}", consumer, self);
        match *self {
            Consumable::Healing { amount } => heal(state, consumer, item_id, amount)?,
            Consumable::Lightning { damage, max_range } => {
                lightning(state, consumer, damage, max_range)?
            }
            Consumable::Fireball { damage, radius } => {
                fireball(state, consumer, target, damage, radius)?
            }
            Consumable::Confusion { turns } => confuse(state, consumer, target, turns)?,
        }

        state.remove_from_inventory(consumer, item_id)?;
        Ok(())
    }
}

fn heal(state: &mut GameState, consumer: EntityId, item_id: EntityId, amount: i32) -> DelveResult<()> {
    let item_name = state.inventory_item(consumer, item_id)?.name.clone();
    let recovered = state
        .entity_mut(consumer)?
        .fighter
        .as_mut()
        .map(|f| f.heal(amount))
        .unwrap_or(0);

    if recovered == 0 {
        return Err(DelveError::Impossible("Your health is already full.".to_string()));
    }
    state.messages.add(
        format!("You consume the {}, and recover {} HP!", item_name, recovered),
        MessageColor::HealthRecovered,
    );
    Ok(())
}

fn lightning(state: &mut GameState, consumer: EntityId, damage: i32, max_range: u32) -> DelveResult<()> {
    let origin = state.entity(consumer)?.position;

    let mut closest: Option<(EntityId, f64)> = None;
    for actor in state.living_actors() {
        if actor.id == consumer || !state.grid.is_visible(actor.position) {
            continue;
        }
        let distance = origin.euclidean_distance(actor.position);
        if distance > max_range as f64 {
            continue;
        }
        if closest.map(|(_, best)| distance < best).unwrap_or(true) {
            closest = Some((actor.id, distance));
        }
    }

    let (target_id, distance) = closest
        .ok_or_else(|| DelveError::Impossible("No enemy is close enough to strike.".to_string()))?;
    debug!("Lightning picked {} at distance {:.1}", target_id, distance);

    let target_name = state.entity(target_id)?.name.clone();
    state.messages.add(
        format!(
            "A lightning bolt strikes the {} with a loud thunder, for {} damage!",
            target_name, damage
        ),
        MessageColor::PlayerAttack,
    );
    state.apply_damage(target_id, damage, Some(consumer))
}

fn fireball(
    state: &mut GameState,
    consumer: EntityId,
    target: Option<Position>,
    damage: i32,
    radius: u32,
) -> DelveResult<()> {
    let target = target.ok_or_else(|| DelveError::Impossible("You must select a target area.".to_string()))?;
    if !state.grid.is_visible(target) {
        return Err(DelveError::Impossible(
            "You cannot target an area that you cannot see.".to_string(),
        ));
    }

    let victims: Vec<(EntityId, String)> = state
        .living_actors()
        .filter(|actor| actor.position.euclidean_distance(target) <= radius as f64)
        .map(|actor| (actor.id, actor.name.clone()))
        .collect();
    if victims.is_empty() {
        return Err(DelveError::Impossible("There are no targets in the radius.".to_string()));
    }

    for (victim, name) in victims {
        state.messages.add(
            format!("The {} is engulfed in a fiery explosion, taking {} damage!", name, damage),
            MessageColor::PlayerAttack,
        );
        state.apply_damage(victim, damage, Some(consumer))?;
    }
    Ok(())
}

fn confuse(state: &mut GameState, consumer: EntityId, target: Option<Position>, turns: u32) -> DelveResult<()> {
    let target = target.ok_or_else(|| DelveError::Impossible("You must select an enemy to target.".to_string()))?;
    if !state.grid.is_visible(target) {
        return Err(DelveError::Impossible(
            "You cannot target an area that you cannot see.".to_string(),
        ));
    }

    let victim_id = state
        .actor_at(target)
        .ok_or_else(|| DelveError::Impossible("You must select an enemy to target.".to_string()))?;
    if victim_id == consumer {
        return Err(DelveError::Impossible("You cannot confuse yourself!".to_string()));
    }

    let victim = state.entity_mut(victim_id)?;
    let previous = victim
        .ai
        .take()
        .ok_or_else(|| DelveError::Impossible("You must select an enemy to target.".to_string()))?;
    victim.ai = Some(previous.confused(turns));
    let name = victim.name.clone();

    state.messages.add(
        format!("The eyes of the {} look vacant, as it starts to stumble around!", name),
        MessageColor::StatusEffect,
    );
    Ok(())
}
