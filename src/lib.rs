//! # Delve
//!
//! A turn-based dungeon-crawler simulation core.
//!
//! ## Architecture Overview
//!
//! Delve is organized around a single owned aggregate, [`GameState`], that
//! every operation receives explicitly:
//!
//! - **Grid**: tile kinds plus visible/explored layers, refreshed by the FOV
//!   engine once per turn
//! - **Entities**: one record type with optional component slots (fighter,
//!   AI, inventory, level, equipment, consumable)
//! - **Actions**: intents that apply atomically or fail with
//!   [`DelveError::Impossible`] and leave the world untouched
//! - **Generation**: seeded room-and-corridor dungeons populated from
//!   depth-weighted spawn tables
//! - **Engine**: player action, then monster actions, then visibility
//!
//! Rendering and input decoding are thin collaborators around the core; the
//! whole state serializes to a single byte blob.

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod utils;

pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

pub use config::{GameConfig, LevelUpBonus};

pub use game::{
    // From actions
    Action,
    BumpAction,
    ConcreteAction,
    DescendAction,
    DropAction,
    EquipAction,
    MeleeAction,
    MoveAction,
    PickupAction,
    UseItemAction,
    WaitAction,
    // From entities
    Direction,
    Entity,
    EntityId,
    Fighter,
    Inventory,
    // From engine and state
    Engine,
    GameState,
    TurnOutcome,
    // From world
    Grid,
    Position,
    TileKind,
};

pub use generation::{GenerationConfig, GeneratedLevel, Generator, Room, RoomCorridorGenerator};

pub use rendering::AsciiDisplay;

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// The action cannot be applied right now. Recoverable: the world is
    /// unchanged and the message is meant for the player.
    #[error("{0}")]
    Impossible(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A text command could not be parsed
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl DelveError {
    pub fn is_impossible(&self) -> bool {
        matches!(self, DelveError::Impossible(_))
    }
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
