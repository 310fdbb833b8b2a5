//! # Display Management
//!
//! Plain-text rendering of a game state: the map, a status line and the most
//! recent messages. The renderer only reads the state.

use crate::game::{GameState, Position};
use crate::DelveResult;

/// Renders frames as text, one character per tile.
#[derive(Debug, Clone)]
pub struct AsciiDisplay {
    /// Message lines shown under the map
    pub message_lines: usize,
}

impl Default for AsciiDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiDisplay {
    pub fn new() -> Self {
        Self { message_lines: 5 }
    }

    /// Draws the map rows only.
    ///
    /// Visible tiles use their light glyph, explored ones their dark glyph
    /// and unseen tiles are blank. Visible entities are drawn over the tiles
    /// in render order, so an actor hides the item it stands on.
    pub fn render_map(&self, state: &GameState) -> Vec<String> {
        let grid = &state.grid;
        let mut rows: Vec<Vec<char>> = (0..grid.height as i32)
            .map(|y| {
                (0..grid.width as i32)
                    .map(|x| grid.render_glyph(Position::new(x, y)).ch)
                    .collect()
            })
            .collect();

        for entity in state.render_entities() {
            let (x, y) = (entity.position.x as usize, entity.position.y as usize);
            if let Some(cell) = rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = entity.glyph;
            }
        }

        rows.into_iter().map(|row| row.into_iter().collect()).collect()
    }

    /// One-line summary of the player's condition.
    pub fn status_line(&self, state: &GameState) -> DelveResult<String> {
        let player = state.player()?;
        let (hp, max_hp) = player
            .fighter
            .as_ref()
            .map(|f| (f.hp, f.max_hp))
            .unwrap_or((0, 0));
        let (level, xp, next) = player
            .level
            .as_ref()
            .map(|l| (l.current_level, l.current_xp, l.experience_to_next_level()))
            .unwrap_or((1, 0, 0));

        Ok(format!(
            "HP: {}/{}  Depth: {}  Level: {}  XP: {}/{}  Turn: {}",
            hp, max_hp, state.depth, level, xp, next, state.turn_number
        ))
    }

    /// Renders a complete frame: map, status line, then recent messages.
    pub fn render(&self, state: &GameState) -> DelveResult<String> {
        let mut lines = self.render_map(state);
        lines.push(self.status_line(state)?);
        lines.extend(
            state
                .messages
                .recent(self.message_lines)
                .into_iter()
                .map(|message| message.full_text()),
        );
        Ok(lines.join("\n"))
    }
}
