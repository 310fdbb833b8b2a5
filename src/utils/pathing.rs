//! # Pathfinding
//!
//! A* over the tile grid for monster movement.
//!
//! Steps are 8-directional. Cardinal steps cost 2 and diagonal steps cost 3 so
//! that straight lines win ties, and tiles occupied by a blocking entity cost
//! an extra 10 so monsters route around each other instead of queueing.

use crate::game::{Grid, Position};
use ::pathfinding::prelude::astar;
use std::collections::HashSet;

const CARDINAL_COST: u32 = 2;
const DIAGONAL_COST: u32 = 3;
const OCCUPIED_PENALTY: u32 = 10;

/// Finds the cheapest walkable path from `start` to `goal`.
///
/// The returned path excludes `start` and ends at `goal`. Returns `None` when
/// the goal is unreachable or `start == goal`.
pub fn find_path(
    grid: &Grid,
    occupied: &HashSet<Position>,
    start: Position,
    goal: Position,
) -> Option<Vec<Position>> {
    if start == goal || !grid.is_walkable(goal) {
        return None;
    }

    let (mut path, _cost) = astar(
        &start,
        |&pos| {
            pos.adjacent_positions()
                .into_iter()
                .filter(|&next| grid.is_walkable(next))
                .map(|next| {
                    let step = if next.x != pos.x && next.y != pos.y {
                        DIAGONAL_COST
                    } else {
                        CARDINAL_COST
                    };
                    let penalty = if next != goal && occupied.contains(&next) {
                        OCCUPIED_PENALTY
                    } else {
                        0
                    };
                    (next, step + penalty)
                })
                .collect::<Vec<_>>()
        },
        |&pos| pos.chebyshev_distance(goal) * CARDINAL_COST,
        |&pos| pos == goal,
    )?;

    path.remove(0);
    Some(path)
}
