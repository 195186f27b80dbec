//! Grid coordinates and hex corner numbering.
//!
//! Boards are laid out on an offset grid where each tile is identified by an
//! `(x, y)` pair. Corners of a hex are numbered clockwise starting at the
//! top-left corner:
//!
//! ```text
//!        1
//!    0 /   \ 2
//!     |     |
//!    5 \   / 3
//!        4
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of corners on a hex tile
pub const CORNER_COUNT: i32 = 6;

/// Minimum number of corners a harbor line may touch
pub const MIN_HARBOR_CORNERS: usize = 2;

/// Maximum number of corners a harbor line may touch
pub const MAX_HARBOR_CORNERS: usize = 3;

/// Position of a tile on the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Point {
    /// Create a new grid point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Whether `corner` names one of the six hex corners.
pub fn is_corner(corner: i32) -> bool {
    (0..CORNER_COUNT).contains(&corner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(3, -1).to_string(), "(3, -1)");
    }

    #[test]
    fn test_point_from_tuple() {
        assert_eq!(Point::from((2, 5)), Point::new(2, 5));
    }

    #[test]
    fn test_corner_range() {
        assert!(is_corner(0));
        assert!(is_corner(5));
        assert!(!is_corner(6));
        assert!(!is_corner(-1));
    }
}
