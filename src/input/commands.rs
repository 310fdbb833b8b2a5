//! # Command Parsing
//!
//! A compact text form of [`PlayerInput`] for scripted play:
//!
//! | command      | input                          |
//! |--------------|--------------------------------|
//! | `h j k l`    | move west, south, north, east  |
//! | `y u b n`    | move diagonally                |
//! | `.`          | wait                           |
//! | `g`          | pick up                        |
//! | `d<n>`       | drop slot n                    |
//! | `a<n>[ x y]` | use slot n, optionally at x,y  |
//! | `e<n>`       | equip or unequip slot n        |
//! | `>`          | descend                        |
//!
//! Scripts are comma separated, e.g. `l,l,g,a0,>`.

use crate::game::Position;
use crate::input::PlayerInput;
use crate::{DelveError, DelveResult};

/// Parses a single command.
///
/// # Examples
///
/// ```
/// use delve::{parse_command, PlayerInput, Position};
///
/// assert_eq!(parse_command("l").unwrap(), PlayerInput::Move(Position::new(1, 0)));
/// assert_eq!(
///     parse_command("a2 10 4").unwrap(),
///     PlayerInput::Use { slot: 2, target: Some(Position::new(10, 4)) }
/// );
/// ```
pub fn parse_command(command: &str) -> DelveResult<PlayerInput> {
    let command = command.trim();
    let mut chars = command.chars();
    let key = chars
        .next()
        .ok_or_else(|| DelveError::InvalidCommand("empty command".to_string()))?;
    let rest = chars.as_str();

    let input = match key {
        'h' | 'j' | 'k' | 'l' | 'y' | 'u' | 'b' | 'n' | '.' | 'g' | '>' if !rest.is_empty() => {
            return Err(DelveError::InvalidCommand(format!(
                "unexpected text after '{}': {}",
                key, command
            )))
        }
        'h' => PlayerInput::Move(Position::new(-1, 0)),
        'j' => PlayerInput::Move(Position::new(0, 1)),
        'k' => PlayerInput::Move(Position::new(0, -1)),
        'l' => PlayerInput::Move(Position::new(1, 0)),
        'y' => PlayerInput::Move(Position::new(-1, -1)),
        'u' => PlayerInput::Move(Position::new(1, -1)),
        'b' => PlayerInput::Move(Position::new(-1, 1)),
        'n' => PlayerInput::Move(Position::new(1, 1)),
        '.' => PlayerInput::Wait,
        'g' => PlayerInput::Pickup,
        '>' => PlayerInput::Descend,
        'd' => PlayerInput::Drop(parse_slot(rest, command)?),
        'e' => PlayerInput::Equip(parse_slot(rest, command)?),
        'a' => {
            let mut parts = rest.split_whitespace();
            let slot = parse_slot(parts.next().unwrap_or(""), command)?;
            let target = match (parts.next(), parts.next(), parts.next()) {
                (None, _, _) => None,
                (Some(x), Some(y), None) => Some(Position::new(
                    parse_number(x, command)?,
                    parse_number(y, command)?,
                )),
                _ => {
                    return Err(DelveError::InvalidCommand(format!(
                        "expected a target as 'x y': {}",
                        command
                    )))
                }
            };
            PlayerInput::Use { slot, target }
        }
        other => {
            return Err(DelveError::InvalidCommand(format!(
                "unknown command '{}'",
                other
            )))
        }
    };
    Ok(input)
}

/// Parses a comma separated script. Empty entries are skipped.
pub fn parse_script(script: &str) -> DelveResult<Vec<PlayerInput>> {
    script
        .split(',')
        .filter(|command| !command.trim().is_empty())
        .map(parse_command)
        .collect()
}

fn parse_slot(text: &str, command: &str) -> DelveResult<usize> {
    text.trim()
        .parse()
        .map_err(|_| DelveError::InvalidCommand(format!("expected a slot number: {}", command)))
}

fn parse_number(text: &str, command: &str) -> DelveResult<i32> {
    text.parse()
        .map_err(|_| DelveError::InvalidCommand(format!("expected a coordinate: {}", command)))
}
