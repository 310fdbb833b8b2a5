//! # Encounter Generation
//!
//! Monster prototypes and the depth-weighted table the dungeon generator
//! draws them from.

use crate::game::{AiPolicy, Entity, Fighter, Level, Rgb};
use crate::generation::{Prototype, SpawnTable};

/// Inventory slots given to monsters
const MONSTER_INVENTORY: usize = 0;

pub fn orc() -> Entity {
    Entity::actor(
        "Orc",
        'o',
        Rgb(63, 127, 63),
        Fighter::new(10, 0, 3),
        Some(AiPolicy::Hostile),
        MONSTER_INVENTORY,
        Level::reward(35),
    )
}

pub fn troll() -> Entity {
    Entity::actor(
        "Troll",
        'T',
        Rgb(0, 127, 0),
        Fighter::new(16, 1, 4),
        Some(AiPolicy::Hostile),
        MONSTER_INVENTORY,
        Level::reward(100),
    )
}

/// Orcs everywhere; trolls from depth 3, growing more common further down.
pub fn monster_table() -> SpawnTable<Prototype> {
    SpawnTable::<Prototype>::new()
        .with(orc, &[(1, 80)])
        .with(troll, &[(3, 15), (5, 30), (7, 60)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monster_prototypes() {
        let orc = orc();
        assert!(orc.is_alive());
        assert!(orc.blocks_movement);
        assert_eq!(orc.power(), 3);
        assert_eq!(orc.level.as_ref().unwrap().xp_given, 35);

        let troll = troll();
        assert_eq!(troll.defense(), 1);
        assert_eq!(troll.fighter.as_ref().unwrap().max_hp, 16);
    }

    #[test]
    fn test_monster_table_by_depth() {
        let names = |depth| -> Vec<String> {
            monster_table()
                .weights(depth)
                .into_iter()
                .map(|(prototype, _)| prototype().name)
                .collect()
        };
        assert_eq!(names(1), vec!["Orc"]);
        assert_eq!(names(3), vec!["Orc", "Troll"]);
    }
}
