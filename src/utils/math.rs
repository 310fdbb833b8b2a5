//! # Game Mathematics
//!
//! Grid line tracing used by line-of-sight checks.

use crate::game::Position;

/// Traces a Bresenham line from `start` to `end`, both endpoints included.
///
/// # Examples
///
/// ```
/// use delve::{bresenham_line, Position};
///
/// let line = bresenham_line(Position::new(0, 0), Position::new(3, 1));
/// assert_eq!(line.first(), Some(&Position::new(0, 0)));
/// assert_eq!(line.last(), Some(&Position::new(3, 1)));
/// assert_eq!(line.len(), 4);
/// ```
pub fn bresenham_line(start: Position, end: Position) -> Vec<Position> {
    let mut points = Vec::new();
    let (mut x, mut y) = (start.x, start.y);

    let dx = (end.x - x).abs();
    let dy = -(end.y - y).abs();
    let sx = if x < end.x { 1 } else { -1 };
    let sy = if y < end.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        points.push(Position::new(x, y));
        if x == end.x && y == end.y {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_single_point() {
        let p = Position::new(4, 4);
        assert_eq!(bresenham_line(p, p), vec![p]);
    }

    #[test]
    fn test_line_is_contiguous() {
        let line = bresenham_line(Position::new(7, 2), Position::new(-3, 9));
        for pair in line.windows(2) {
            assert_eq!(pair[0].chebyshev_distance(pair[1]), 1);
        }
        assert_eq!(line.len(), 11);
    }

    #[test]
    fn test_line_straight() {
        let line = bresenham_line(Position::new(0, 0), Position::new(0, 3));
        assert_eq!(
            line,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(0, 3)
            ]
        );
    }
}
