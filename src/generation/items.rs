//! # Item Generation
//!
//! Item prototypes: consumables and equipment, plus the depth-weighted table
//! used to scatter them through the dungeon.

use crate::game::{Consumable, Entity, EquipmentSlot, Rgb};
use crate::generation::{Prototype, SpawnTable};

pub fn health_potion() -> Entity {
    Entity::item("Health Potion", '!', Rgb(127, 0, 255))
        .with_consumable(Consumable::Healing { amount: 4 })
}

pub fn lightning_scroll() -> Entity {
    Entity::item("Lightning Scroll", '~', Rgb(255, 255, 0)).with_consumable(Consumable::Lightning {
        damage: 20,
        max_range: 5,
    })
}

pub fn confusion_scroll() -> Entity {
    Entity::item("Confusion Scroll", '~', Rgb(207, 63, 255))
        .with_consumable(Consumable::Confusion { turns: 10 })
}

pub fn fireball_scroll() -> Entity {
    Entity::item("Fireball Scroll", '~', Rgb(255, 0, 0)).with_consumable(Consumable::Fireball {
        damage: 12,
        radius: 3,
    })
}

pub fn dagger() -> Entity {
    Entity::item("Dagger", '/', Rgb(0, 191, 255)).with_equippable(EquipmentSlot::Weapon, 2, 0)
}

pub fn sword() -> Entity {
    Entity::item("Sword", '/', Rgb(0, 191, 255)).with_equippable(EquipmentSlot::Weapon, 4, 0)
}

pub fn leather_armor() -> Entity {
    Entity::item("Leather Armor", '[', Rgb(139, 69, 19)).with_equippable(EquipmentSlot::Armor, 0, 1)
}

pub fn chain_mail() -> Entity {
    Entity::item("Chain Mail", '[', Rgb(139, 69, 19)).with_equippable(EquipmentSlot::Armor, 0, 3)
}

pub fn item_table() -> SpawnTable<Prototype> {
    SpawnTable::<Prototype>::new()
        .with(health_potion, &[(1, 35)])
        .with(confusion_scroll, &[(2, 10)])
        .with(lightning_scroll, &[(4, 25)])
        .with(sword, &[(4, 5)])
        .with(fireball_scroll, &[(6, 25)])
        .with(chain_mail, &[(6, 15)])
}
