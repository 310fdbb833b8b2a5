//! # Delve Main Entry Point
//!
//! Starts or loads a game, plays it from a command script or the built-in
//! auto-player, optionally saves it, and prints the final frame.

use clap::Parser;
use delve::{
    parse_script, AsciiDisplay, DelveResult, Engine, GameConfig, GameState, PlayerInput,
    TurnOutcome,
};
use log::{error, info};
use std::path::PathBuf;

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "A turn-based dungeon crawler simulation")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Auto-play this many turns: attack adjacent monsters, otherwise wait
    #[arg(short, long, default_value_t = 0)]
    turns: u32,

    /// Comma separated commands to play, e.g. "l,l,g,a0,>"
    #[arg(short, long)]
    commands: Option<String>,

    /// JSON game configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the game here when done
    #[arg(long)]
    save: Option<PathBuf>,

    /// Resume a saved game instead of starting a new one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn run(args: &Args) -> DelveResult<()> {
    info!("Starting Delve v{}", delve::VERSION);

    let mut engine = match &args.load {
        Some(path) => Engine::load_from_file(path)?,
        None => {
            let mut config = match &args.config {
                Some(path) => GameConfig::from_json_file(path)?,
                None => GameConfig::default(),
            };
            if let Some(seed) = args.seed {
                config.generation.seed = seed;
            }
            Engine::new(config)?
        }
    };

    let result = play(&mut engine, args);

    // Keep what was played even if a turn failed.
    if let Some(path) = &args.save {
        engine.save_to_file(path)?;
    }
    result?;

    println!("{}", AsciiDisplay::new().render(&engine.state)?);
    Ok(())
}

fn play(engine: &mut Engine, args: &Args) -> DelveResult<()> {
    if let Some(script) = &args.commands {
        for input in parse_script(script)? {
            if report(engine.handle_input(input)?) {
                return Ok(());
            }
        }
    }

    for _ in 0..args.turns {
        let input = auto_play(&engine.state);
        if report(engine.handle_input(input)?) {
            break;
        }
    }
    Ok(())
}

/// Logs a turn outcome; true once the player is dead.
fn report(outcome: TurnOutcome) -> bool {
    match outcome {
        TurnOutcome::Completed => false,
        TurnOutcome::Rejected(reason) => {
            info!("Rejected: {}", reason);
            false
        }
        TurnOutcome::PlayerDied => {
            info!("The player has died");
            true
        }
    }
}

/// Attacks an adjacent monster if there is one, otherwise waits.
fn auto_play(state: &GameState) -> PlayerInput {
    let Ok(player) = state.player() else {
        return PlayerInput::Wait;
    };
    if !player.is_alive() {
        return PlayerInput::Wait;
    }
    state
        .living_actors()
        .filter(|actor| actor.id != player.id)
        .find(|actor| actor.position.chebyshev_distance(player.position) == 1)
        .map(|target| PlayerInput::Move(target.position - player.position))
        .unwrap_or(PlayerInput::Wait)
}
