//! # World Module
//!
//! The tile grid the simulation runs on.
//!
//! Tiles are plain values: the grid stores a [`TileKind`] per position and
//! every kind maps to an immutable [`TileDef`] describing walkability,
//! transparency and the two render variants. Alongside the tiles the grid
//! keeps two same-shaped boolean layers, `visible` (recomputed every turn) and
//! `explored` (monotonic union of everything ever visible).

use crate::game::{fov, Position};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// A character with foreground and background colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Glyph {
    pub const fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Self { ch, fg, bg }
    }
}

/// Static properties of a tile kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDef {
    /// Whether actors can stand on this tile
    pub walkable: bool,
    /// Whether this tile lets light through
    pub transparent: bool,
    /// Drawn when explored but not currently in view
    pub dark: Glyph,
    /// Drawn when currently in view
    pub light: Glyph,
}

/// Glyph for tiles that have never been seen.
pub const SHROUD: Glyph = Glyph::new(' ', Rgb::WHITE, Rgb::BLACK);

const FLOOR: TileDef = TileDef {
    walkable: true,
    transparent: true,
    dark: Glyph::new('.', Rgb(100, 100, 100), Rgb(50, 50, 150)),
    light: Glyph::new('.', Rgb::WHITE, Rgb(200, 180, 50)),
};

const WALL: TileDef = TileDef {
    walkable: false,
    transparent: false,
    dark: Glyph::new('#', Rgb(100, 100, 100), Rgb(0, 0, 100)),
    light: Glyph::new('#', Rgb::WHITE, Rgb(130, 110, 50)),
};

const DOWN_STAIRS: TileDef = TileDef {
    walkable: true,
    transparent: true,
    dark: Glyph::new('>', Rgb(0, 0, 100), Rgb(50, 50, 150)),
    light: Glyph::new('>', Rgb::WHITE, Rgb(200, 180, 50)),
};

/// The kinds of tile a grid can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    DownStairs,
}

impl TileKind {
    /// Looks up the static definition of this kind.
    pub fn def(self) -> &'static TileDef {
        match self {
            TileKind::Wall => &WALL,
            TileKind::Floor => &FLOOR,
            TileKind::DownStairs => &DOWN_STAIRS,
        }
    }

    pub fn is_walkable(self) -> bool {
        self.def().walkable
    }

    pub fn is_transparent(self) -> bool {
        self.def().transparent
    }
}

/// Fixed-size 2D array of tiles with visibility layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    tiles: Vec<TileKind>,
    visible: Vec<bool>,
    explored: Vec<bool>,
}

impl Grid {
    /// Creates a grid filled with the given tile kind, nothing seen yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Grid, Position, TileKind};
    ///
    /// let grid = Grid::new(10, 5, TileKind::Wall);
    /// assert_eq!(grid.tile(Position::new(3, 3)), Some(TileKind::Wall));
    /// assert_eq!(grid.tile(Position::new(10, 0)), None);
    /// ```
    pub fn new(width: u32, height: u32, fill: TileKind) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            tiles: vec![fill; len],
            visible: vec![false; len],
            explored: vec![false; len],
        }
    }

    /// Checks that every layer holds exactly `width * height` cells.
    ///
    /// Grids built with [`Grid::new`] always pass; deserialized ones may not.
    pub fn check_layers(&self) -> DelveResult<()> {
        let expected = self.width as usize * self.height as usize;
        let layers = [
            ("tiles", self.tiles.len()),
            ("visible", self.visible.len()),
            ("explored", self.explored.len()),
        ];
        for (name, len) in layers {
            if len != expected {
                return Err(DelveError::InvalidState(format!(
                    "{} layer has {} cells, expected {} for a {}x{} grid",
                    name, len, expected, self.width, self.height
                )));
            }
        }
        Ok(())
    }

    /// Returns true if the position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Gets the tile kind at a position.
    pub fn tile(&self, pos: Position) -> Option<TileKind> {
        self.index(pos).and_then(|i| self.tiles.get(i).copied())
    }

    /// Sets the tile kind at a position.
    pub fn set_tile(&mut self, pos: Position, kind: TileKind) -> DelveResult<()> {
        let index = self
            .index(pos)
            .ok_or_else(|| DelveError::InvalidState(format!("{:?} is outside the grid", pos)))?;
        if let Some(tile) = self.tiles.get_mut(index) {
            *tile = kind;
        }
        Ok(())
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).map(TileKind::is_walkable).unwrap_or(false)
    }

    pub fn is_transparent(&self, pos: Position) -> bool {
        self.tile(pos).map(TileKind::is_transparent).unwrap_or(false)
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.index(pos).and_then(|i| self.visible.get(i).copied()).unwrap_or(false)
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.index(pos).and_then(|i| self.explored.get(i).copied()).unwrap_or(false)
    }

    /// Recomputes the visible layer from `origin` and merges it into explored.
    ///
    /// The visible layer is rebuilt from scratch, never patched.
    pub fn update_visibility(&mut self, origin: Position, radius: u32) {
        let visible = fov::compute_fov(self, origin, radius);
        for (explored, seen) in self.explored.iter_mut().zip(&visible) {
            *explored |= *seen;
        }
        self.visible = visible;
    }

    /// Glyph the renderer should draw for a position.
    ///
    /// Light variant when visible, dark when only explored, shroud otherwise.
    pub fn render_glyph(&self, pos: Position) -> Glyph {
        match self.tile(pos) {
            Some(kind) if self.is_visible(pos) => kind.def().light,
            Some(kind) if self.is_explored(pos) => kind.def().dark,
            _ => SHROUD,
        }
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }

    /// Counts tiles an actor could stand on.
    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|kind| kind.is_walkable()).count()
    }

    /// Finds the first tile of the given kind in row-major order.
    pub fn find_tile(&self, kind: TileKind) -> Option<Position> {
        self.positions().find(|&pos| self.tile(pos) == Some(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_definitions() {
        assert!(TileKind::Floor.is_walkable());
        assert!(TileKind::Floor.is_transparent());
        assert!(!TileKind::Wall.is_walkable());
        assert!(!TileKind::Wall.is_transparent());
        assert!(TileKind::DownStairs.is_walkable());
        assert_eq!(TileKind::DownStairs.def().light.ch, '>');
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = Grid::new(4, 3, TileKind::Wall);
        assert!(grid.in_bounds(Position::new(3, 2)));
        assert!(!grid.in_bounds(Position::new(4, 2)));
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(grid.set_tile(Position::new(5, 5), TileKind::Floor).is_err());

        grid.set_tile(Position::new(1, 1), TileKind::Floor).unwrap();
        assert!(grid.is_walkable(Position::new(1, 1)));
        assert!(!grid.is_walkable(Position::new(0, 0)));
        assert!(!grid.is_walkable(Position::new(99, 99)));
        assert_eq!(grid.walkable_count(), 1);
    }

    #[test]
    fn test_visibility_merges_into_explored() {
        let mut grid = Grid::new(20, 3, TileKind::Floor);
        grid.update_visibility(Position::new(1, 1), 3);
        assert!(grid.is_visible(Position::new(3, 1)));
        assert!(grid.is_explored(Position::new(3, 1)));

        grid.update_visibility(Position::new(18, 1), 3);
        assert!(!grid.is_visible(Position::new(3, 1)));
        assert!(grid.is_explored(Position::new(3, 1)));
        assert!(grid.is_visible(Position::new(17, 1)));
    }

    #[test]
    fn test_render_glyph_variants() {
        let mut grid = Grid::new(20, 3, TileKind::Floor);
        let pos = Position::new(2, 1);
        assert_eq!(grid.render_glyph(pos), SHROUD);

        grid.update_visibility(Position::new(1, 1), 3);
        assert_eq!(grid.render_glyph(pos), TileKind::Floor.def().light);

        grid.update_visibility(Position::new(18, 1), 3);
        assert_eq!(grid.render_glyph(pos), TileKind::Floor.def().dark);
    }

    #[test]
    fn test_check_layers() {
        let grid = Grid::new(6, 4, TileKind::Floor);
        assert!(grid.check_layers().is_ok());

        let mut value = serde_json::to_value(&grid).unwrap();
        value["height"] = serde_json::json!(5);
        let stretched: Grid = serde_json::from_value(value).unwrap();
        assert!(stretched.check_layers().is_err());
        assert!(!stretched.is_visible(Position::new(5, 4)));
    }
}
