//! Integration tests for taking the stairs to deeper levels.

use delve::{
    DescendAction, DelveResult, Engine, GameConfig, MessageColor, PlayerInput, TileKind,
    TurnOutcome,
};

fn engine_on_stairs(seed: u64) -> DelveResult<Engine> {
    let mut engine = Engine::new(GameConfig::for_testing(seed))?;
    let stairs = engine
        .state
        .grid
        .find_tile(TileKind::DownStairs)
        .expect("level should have stairs");
    let player_id = engine.player_id();
    engine.state.entity_mut(player_id)?.position = stairs;
    engine.state.update_fov()?;
    Ok(engine)
}

/// Descending regenerates the level and keeps the player.
#[test]
fn test_descend_keeps_player() -> DelveResult<()> {
    let mut engine = engine_on_stairs(98765)?;
    let player_id = engine.player_id();
    let player_before = engine.state.player()?.clone();
    let grid_before = engine.state.grid.clone();

    let outcome = engine.advance(DescendAction::new(player_id).into())?;
    assert!(matches!(outcome, TurnOutcome::Completed | TurnOutcome::PlayerDied));
    assert_eq!(engine.state.depth, 2);
    assert_ne!(engine.state.grid, grid_before);

    let player = engine.state.player()?;
    assert_eq!(player.id, player_before.id);
    assert_eq!(player.inventory, player_before.inventory);
    assert_eq!(player.equipment, player_before.equipment);
    assert_eq!(player.level, player_before.level);
    assert!(engine.state.grid.is_visible(player.position));

    assert!(engine
        .state
        .messages
        .messages()
        .any(|m| m.text == "You descend the staircase." && m.color == MessageColor::Descend));
    Ok(())
}

/// Explored memory does not carry over to the new level.
#[test]
fn test_descend_resets_exploration() -> DelveResult<()> {
    let mut engine = engine_on_stairs(54321)?;
    let player_id = engine.player_id();
    engine.advance(DescendAction::new(player_id).into())?;

    let grid = &engine.state.grid;
    let remembered = grid
        .positions()
        .filter(|&pos| grid.is_explored(pos) && !grid.is_visible(pos))
        .count();
    assert_eq!(remembered, 0);
    Ok(())
}

#[test]
fn test_descend_off_stairs_is_rejected() -> DelveResult<()> {
    let mut engine = Engine::new(GameConfig::for_testing(777))?;
    let outcome = engine.handle_input(PlayerInput::Descend)?;
    assert_eq!(outcome, TurnOutcome::Rejected("There are no stairs here.".to_string()));
    assert_eq!(engine.state.depth, 1);
    assert_eq!(engine.state.turn_number, 0);
    Ok(())
}

/// Every level down the dungeon has stairs to continue.
#[test]
fn test_repeated_descent() -> DelveResult<()> {
    let mut engine = engine_on_stairs(13579)?;
    for expected_depth in 2..=6 {
        let player_id = engine.player_id();
        let stairs = engine
            .state
            .grid
            .find_tile(TileKind::DownStairs)
            .expect("level should have stairs");
        engine.state.entity_mut(player_id)?.position = stairs;
        // Keep the run alive regardless of what spawns nearby.
        if let Some(fighter) = engine.state.entity_mut(player_id)?.fighter.as_mut() {
            fighter.hp = fighter.max_hp;
        }

        engine.handle_input(PlayerInput::Descend)?;
        assert_eq!(engine.state.depth, expected_depth);
    }
    Ok(())
}
