//! # Field of View
//!
//! Computes which tiles are visible from a point within a radius.
//!
//! Each candidate tile inside the circular radius is tested with a Bresenham
//! ray from the origin. Opaque tiles stop the ray but are themselves lit, so
//! room walls show up around the viewer.

use crate::game::{Grid, Position};
use crate::utils::bresenham_line;

/// Returns a row-major visibility mask the same shape as `grid`.
pub fn compute_fov(grid: &Grid, origin: Position, radius: u32) -> Vec<bool> {
    let mut visible = vec![false; grid.width as usize * grid.height as usize];
    if !grid.in_bounds(origin) {
        return visible;
    }

    let r = radius as i32;
    for y in (origin.y - r)..=(origin.y + r) {
        for x in (origin.x - r)..=(origin.x + r) {
            let target = Position::new(x, y);
            if !grid.in_bounds(target) {
                continue;
            }
            let (dx, dy) = (x - origin.x, y - origin.y);
            if dx * dx + dy * dy > r * r {
                continue;
            }
            if has_line_of_sight(grid, origin, target) {
                visible[y as usize * grid.width as usize + x as usize] = true;
            }
        }
    }

    visible
}

/// True if nothing opaque lies strictly between `from` and `to`.
pub fn has_line_of_sight(grid: &Grid, from: Position, to: Position) -> bool {
    let line = bresenham_line(from, to);
    line.iter()
        .skip(1)
        .take(line.len().saturating_sub(2))
        .all(|&pos| grid.is_transparent(pos))
}
