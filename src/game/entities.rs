//! # Entity System
//!
//! Actors and items share one [`Entity`] record with optional component
//! slots. Behavior questions such as "does this block movement" or "can this
//! fight" are answered by which slots are filled, not by a type hierarchy.
//!
//! Components that need to point at other entities (equipment slots pointing
//! at inventory items) store an [`EntityId`] and resolve it at use time.

use crate::game::{AiPolicy, Consumable, EntityId, Position, Rgb};
use serde::{Deserialize, Serialize};

/// Drawing priority when several entities share a tile. Higher draws on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    Corpse,
    Item,
    Actor,
}

/// Hit points and base combat stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub hp: i32,
    pub max_hp: i32,
    pub base_defense: i32,
    pub base_power: i32,
}

impl Fighter {
    /// Creates a fighter at full health.
    pub fn new(hp: i32, base_defense: i32, base_power: i32) -> Self {
        Self {
            hp,
            max_hp: hp,
            base_defense,
            base_power,
        }
    }

    /// Restores up to `amount` hit points and returns how many were restored.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Fighter;
    ///
    /// let mut fighter = Fighter::new(10, 0, 1);
    /// fighter.hp = 7;
    /// assert_eq!(fighter.heal(5), 3);
    /// assert_eq!(fighter.hp, 10);
    /// assert_eq!(fighter.heal(5), 0);
    /// ```
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.hp >= self.max_hp {
            return 0;
        }
        let new_hp = (self.hp + amount).min(self.max_hp);
        let recovered = new_hp - self.hp;
        self.hp = new_hp;
        recovered
    }

    /// Removes hit points, clamping at zero.
    ///
    /// Returns true only on the hit that takes hp from positive to zero.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 || self.hp == 0 {
            return false;
        }
        self.hp = (self.hp - amount).max(0);
        self.hp == 0
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }
}

/// Items carried by an actor, in pickup order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<Entity>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Adds an item, handing it back if there is no room.
    pub fn add(&mut self, item: Entity) -> Result<(), Entity> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, item_id: EntityId) -> Option<&Entity> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Removes an item by id, preserving the order of the rest.
    pub fn remove(&mut self, item_id: EntityId) -> Option<Entity> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        Some(self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Experience tracking and level progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub current_level: u32,
    pub current_xp: u32,
    /// Awarded to whoever kills the owner
    pub xp_given: u32,
    pub level_up_base: u32,
    pub level_up_factor: u32,
}

impl Level {
    /// Progression for something that levels up (the player).
    pub fn progressing(level_up_base: u32, level_up_factor: u32) -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            xp_given: 0,
            level_up_base,
            level_up_factor,
        }
    }

    /// Progression for a monster that only hands out experience.
    pub fn reward(xp_given: u32) -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            xp_given,
            level_up_base: 0,
            level_up_factor: 0,
        }
    }

    /// Experience needed to reach the next level from the current one.
    pub fn experience_to_next_level(&self) -> u32 {
        self.level_up_base + self.current_level * self.level_up_factor
    }

    /// Adds experience and returns how many levels were gained.
    ///
    /// Leftover experience carries into the next level, so a large award can
    /// trigger several level-ups in sequence. Entities with a zero
    /// `level_up_base` never gain experience.
    pub fn add_xp(&mut self, xp: u32) -> u32 {
        if xp == 0 || self.level_up_base == 0 {
            return 0;
        }

        self.current_xp += xp;
        let mut gained = 0;
        while self.current_xp >= self.experience_to_next_level() {
            self.current_xp -= self.experience_to_next_level();
            self.current_level += 1;
            gained += 1;
        }
        gained
    }
}

/// Which equipment slot an item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
}

/// Stat bonuses granted while an item is equipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equippable {
    pub slot: EquipmentSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
}

/// Equipped items, referenced by id into the owner's inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<EntityId>,
    pub armor: Option<EntityId>,
}

impl Equipment {
    pub fn get(&self, slot: EquipmentSlot) -> Option<EntityId> {
        match slot {
            EquipmentSlot::Weapon => self.weapon,
            EquipmentSlot::Armor => self.armor,
        }
    }

    pub fn set(&mut self, slot: EquipmentSlot, item: Option<EntityId>) {
        match slot {
            EquipmentSlot::Weapon => self.weapon = item,
            EquipmentSlot::Armor => self.armor = item,
        }
    }

    /// Slot the item is equipped in, if any.
    pub fn slot_of(&self, item_id: EntityId) -> Option<EquipmentSlot> {
        if self.weapon == Some(item_id) {
            Some(EquipmentSlot::Weapon)
        } else if self.armor == Some(item_id) {
            Some(EquipmentSlot::Armor)
        } else {
            None
        }
    }

    fn equipped(&self) -> impl Iterator<Item = EntityId> {
        self.weapon.into_iter().chain(self.armor)
    }
}

/// Anything placed on the map: actors, items and corpses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    pub glyph: char,
    pub color: Rgb,
    pub name: String,
    pub blocks_movement: bool,
    pub render_order: RenderOrder,
    pub fighter: Option<Fighter>,
    pub ai: Option<AiPolicy>,
    pub inventory: Option<Inventory>,
    pub level: Option<Level>,
    pub equipment: Option<Equipment>,
    pub equippable: Option<Equippable>,
    pub consumable: Option<Consumable>,
}

impl Entity {
    /// Creates an actor prototype. Actors block movement and draw on top.
    pub fn actor(
        name: &str,
        glyph: char,
        color: Rgb,
        fighter: Fighter,
        ai: Option<AiPolicy>,
        inventory_capacity: usize,
        level: Level,
    ) -> Self {
        Self {
            id: EntityId::nil(),
            position: Position::new(0, 0),
            glyph,
            color,
            name: name.to_string(),
            blocks_movement: true,
            render_order: RenderOrder::Actor,
            fighter: Some(fighter),
            ai,
            inventory: Some(Inventory::new(inventory_capacity)),
            level: Some(level),
            equipment: Some(Equipment::default()),
            equippable: None,
            consumable: None,
        }
    }

    /// Creates an item prototype with no capabilities attached yet.
    pub fn item(name: &str, glyph: char, color: Rgb) -> Self {
        Self {
            id: EntityId::nil(),
            position: Position::new(0, 0),
            glyph,
            color,
            name: name.to_string(),
            blocks_movement: false,
            render_order: RenderOrder::Item,
            fighter: None,
            ai: None,
            inventory: None,
            level: None,
            equipment: None,
            equippable: None,
            consumable: None,
        }
    }

    pub fn with_consumable(mut self, consumable: Consumable) -> Self {
        self.consumable = Some(consumable);
        self
    }

    pub fn with_equippable(mut self, slot: EquipmentSlot, power_bonus: i32, defense_bonus: i32) -> Self {
        self.equippable = Some(Equippable {
            slot,
            power_bonus,
            defense_bonus,
        });
        self
    }

    /// The player character. It has no AI; its turns come from input.
    pub fn player() -> Self {
        Self::actor(
            "Player",
            '@',
            Rgb::WHITE,
            Fighter::new(30, 1, 2),
            None,
            26,
            Level::progressing(200, 150),
        )
    }

    /// Clones this prototype as a fresh instance with its own identity.
    pub fn spawn(&self, id: EntityId, position: Position) -> Self {
        let mut entity = self.clone();
        entity.id = id;
        entity.position = position;
        entity
    }

    pub fn is_alive(&self) -> bool {
        !self.is_corpse() && self.fighter.as_ref().map(|f| !f.is_dead()).unwrap_or(false)
    }

    pub fn is_item(&self) -> bool {
        self.consumable.is_some() || self.equippable.is_some()
    }

    pub fn is_corpse(&self) -> bool {
        self.render_order == RenderOrder::Corpse
    }

    fn equipped_bonus(&self, bonus: impl Fn(&Equippable) -> i32) -> i32 {
        let (Some(equipment), Some(inventory)) = (&self.equipment, &self.inventory) else {
            return 0;
        };
        equipment
            .equipped()
            .filter_map(|id| inventory.get(id))
            .filter_map(|item| item.equippable.as_ref())
            .map(bonus)
            .sum()
    }

    /// Base power plus equipment bonuses.
    pub fn power(&self) -> i32 {
        let base = self.fighter.as_ref().map(|f| f.base_power).unwrap_or(0);
        base + self.equipped_bonus(|e| e.power_bonus)
    }

    /// Base defense plus equipment bonuses.
    pub fn defense(&self) -> i32 {
        let base = self.fighter.as_ref().map(|f| f.base_defense).unwrap_or(0);
        base + self.equipped_bonus(|e| e.defense_bonus)
    }

    pub fn is_equipped(&self, item_id: EntityId) -> bool {
        self.equipment
            .as_ref()
            .and_then(|e| e.slot_of(item_id))
            .is_some()
    }

    /// Turns this actor into its corpse. Returns false if it already was one.
    ///
    /// The transition is one-way: the corpse no longer blocks, has no AI and
    /// draws beneath items and actors.
    pub fn die(&mut self) -> bool {
        if self.is_corpse() {
            return false;
        }
        if let Some(fighter) = self.fighter.as_mut() {
            fighter.hp = 0;
        }
        self.glyph = '%';
        self.color = Rgb(191, 0, 0);
        self.blocks_movement = false;
        self.ai = None;
        self.name = format!("remains of {}", self.name);
        self.render_order = RenderOrder::Corpse;
        true
    }

    /// Adds experience and applies stat increases for every level gained.
    pub fn gain_xp(&mut self, xp: u32, bonus: &crate::config::LevelUpBonus) -> u32 {
        let gained = self.level.as_mut().map(|l| l.add_xp(xp)).unwrap_or(0);
        if let Some(fighter) = self.fighter.as_mut() {
            for _ in 0..gained {
                fighter.max_hp += bonus.hp;
                fighter.hp += bonus.hp;
                fighter.base_power += bonus.power;
                fighter.base_defense += bonus.defense;
            }
        }
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelUpBonus;
    use crate::game::new_entity_id;

    fn sword() -> Entity {
        Entity::item("Sword", '/', Rgb(0, 191, 255))
            .with_equippable(EquipmentSlot::Weapon, 4, 0)
            .spawn(new_entity_id(), Position::new(0, 0))
    }

    #[test]
    fn test_heal_clamps_and_reports() {
        let mut fighter = Fighter::new(10, 0, 1);
        assert_eq!(fighter.heal(4), 0);
        fighter.hp = 3;
        assert_eq!(fighter.heal(4), 4);
        assert_eq!(fighter.heal(100), 3);
        assert_eq!(fighter.hp, fighter.max_hp);
    }

    #[test]
    fn test_damage_sequence_dies_once() {
        let mut fighter = Fighter::new(10, 0, 0);
        assert!(!fighter.take_damage(4));
        assert_eq!(fighter.hp, 6);
        assert!(!fighter.take_damage(4));
        assert_eq!(fighter.hp, 2);
        assert!(fighter.take_damage(4));
        assert_eq!(fighter.hp, 0);
        assert!(!fighter.take_damage(4));
        assert_eq!(fighter.hp, 0);
    }

    #[test]
    fn test_inventory_capacity() {
        let mut inventory = Inventory::new(1);
        let first = sword();
        let first_id = first.id;
        assert!(inventory.add(first).is_ok());
        let rejected = inventory.add(sword());
        assert!(rejected.is_err());
        assert_eq!(inventory.len(), 1);
        assert!(inventory.remove(first_id).is_some());
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_level_up_thresholds() {
        let mut level = Level::progressing(200, 150);
        assert_eq!(level.experience_to_next_level(), 350);
        assert_eq!(level.add_xp(100), 0);
        assert_eq!(level.add_xp(300), 1);
        assert_eq!(level.current_level, 2);
        assert_eq!(level.current_xp, 50);
        assert_eq!(level.experience_to_next_level(), 500);

        // One large award crosses two thresholds.
        assert_eq!(level.add_xp(1100), 2);
        assert_eq!(level.current_level, 4);
    }

    #[test]
    fn test_monsters_do_not_level() {
        let mut level = Level::reward(35);
        assert_eq!(level.add_xp(1000), 0);
        assert_eq!(level.current_level, 1);
    }

    #[test]
    fn test_gain_xp_applies_bonus() {
        let mut player = Entity::player();
        let bonus = LevelUpBonus {
            hp: 10,
            power: 1,
            defense: 1,
        };
        assert_eq!(player.gain_xp(350, &bonus), 1);
        let fighter = player.fighter.as_ref().unwrap();
        assert_eq!(fighter.max_hp, 40);
        assert_eq!(fighter.base_power, 3);
        assert_eq!(fighter.base_defense, 2);
    }

    #[test]
    fn test_equipment_bonuses() {
        let mut player = Entity::player();
        let sword = sword();
        let sword_id = sword.id;
        player.inventory.as_mut().unwrap().add(sword).unwrap();
        assert_eq!(player.power(), 2);

        player.equipment.as_mut().unwrap().set(EquipmentSlot::Weapon, Some(sword_id));
        assert_eq!(player.power(), 6);
        assert!(player.is_equipped(sword_id));
        assert_eq!(player.defense(), 1);
    }

    #[test]
    fn test_death_transition_is_one_way() {
        let mut orc = Entity::actor(
            "Orc",
            'o',
            Rgb(63, 127, 63),
            Fighter::new(10, 0, 3),
            Some(AiPolicy::Hostile),
            0,
            Level::reward(35),
        );
        assert!(orc.blocks_movement);
        assert!(orc.die());
        assert_eq!(orc.name, "remains of Orc");
        assert_eq!(orc.glyph, '%');
        assert!(orc.ai.is_none());
        assert!(!orc.blocks_movement);
        assert!(!orc.is_alive());
        assert_eq!(orc.fighter.as_ref().unwrap().hp, 0);

        assert!(!orc.die());
        assert_eq!(orc.name, "remains of Orc");
    }

    proptest::proptest! {
        #[test]
        fn heal_never_exceeds_max(max_hp in 1i32..200, damage in 0i32..200, amount in -50i32..300) {
            let mut fighter = Fighter::new(max_hp, 0, 0);
            fighter.take_damage(damage.min(max_hp - 1));
            let before = fighter.hp;

            let recovered = fighter.heal(amount);
            proptest::prop_assert_eq!(recovered, (max_hp - before).min(amount.max(0)));
            proptest::prop_assert_eq!(fighter.hp, before + recovered);
            proptest::prop_assert!(fighter.hp <= fighter.max_hp);
        }
    }
}
