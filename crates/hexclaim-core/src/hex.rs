//! Hex coordinate system using axial coordinates (q, r).
//!
//! The playable area is always a hexagon of some radius centered on the
//! origin. A coordinate is inside a hexagon of radius `size` when
//! `max(|q|, |r|, |q + r|) <= size`, and on its outer ring when that maximum
//! equals `size`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a neighboring hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}

impl Direction {
    /// All directions, clockwise starting from East.
    ///
    /// This order is the scan order used wherever "the first matching
    /// neighbor" matters (e.g. the naive enemy agent).
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// Axial offset `(dq, dr)` of this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::SouthEast => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (0, -1),
            Direction::NorthEast => (1, -1),
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: Direction) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// The six neighboring hexes in [`Direction::ALL`] order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Whether `other` is one of the six neighbors of this hex
    pub fn is_adjacent(&self, other: &HexCoord) -> bool {
        self.distance_to(other) == 1
    }

    /// Distance to another hex (in hex steps)
    ///
    /// Computed in `i64` so coordinates anywhere in the `i32` range are
    /// safe; distances beyond `u32::MAX` saturate.
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        let ds = -dq - dr;
        let steps = dq.abs().max(dr.abs()).max(ds.abs());
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// Distance from the origin
    pub fn radius(&self) -> u32 {
        self.distance_to(&HexCoord::default())
    }

    /// Whether this hex lies inside a hexagon of radius `size`
    pub fn within(&self, size: i32) -> bool {
        size >= 0 && self.radius() <= size as u32
    }

    /// Whether this hex lies on the outer ring of a hexagon of radius `size`
    pub fn on_boundary(&self, size: i32) -> bool {
        size >= 0 && self.radius() == size as u32
    }

    /// Every coordinate of the hexagon of radius `size`, ordered by (q, r)
    pub fn hexagon(size: i32) -> Vec<HexCoord> {
        let mut coords = Vec::new();
        for q in -size..=size {
            let r_min = (-size).max(-q - size);
            let r_max = size.min(-q + size);
            for r in r_min..=r_max {
                coords.push(HexCoord::new(q, r));
            }
        }
        coords
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Number of cells in a hexagon of radius `size`
pub const fn hexagon_cell_count(size: i32) -> usize {
    (3 * size * (size + 1) + 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hex_neighbors() {
        let center = HexCoord::new(0, 0);
        let neighbors = center.neighbors();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
            assert!(center.is_adjacent(neighbor));
        }
    }

    #[test]
    fn test_hex_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        assert_eq!(a.distance_to(&b), 2);

        let c = HexCoord::new(-3, 3);
        assert_eq!(a.distance_to(&c), 3);

        let d = HexCoord::new(3, 0);
        let e = HexCoord::new(-3, 0);
        assert_eq!(d.distance_to(&e), 6);
    }

    #[test]
    fn test_distance_at_coordinate_extremes() {
        let origin = HexCoord::default();
        let far_east = HexCoord::new(i32::MAX, 0);
        let far_west = HexCoord::new(i32::MIN, 0);

        assert_eq!(origin.distance_to(&far_east), i32::MAX as u32);
        assert_eq!(far_west.radius(), 1 << 31);
        assert_eq!(far_east.distance_to(&far_west), u32::MAX);
        assert_eq!(HexCoord::new(i32::MIN, i32::MIN).radius(), u32::MAX);

        assert!(!origin.is_adjacent(&far_east));
        assert!(!far_west.within(4));
        assert!(!far_east.on_boundary(i32::MAX - 1));
        assert!(far_east.on_boundary(i32::MAX));
    }

    #[test]
    fn test_not_adjacent_to_self() {
        let hex = HexCoord::new(1, -2);
        assert!(!hex.is_adjacent(&hex));
        assert!(!hex.is_adjacent(&HexCoord::new(3, -2)));
    }

    #[test]
    fn test_boundary_and_range() {
        assert!(HexCoord::new(4, 0).on_boundary(4));
        assert!(HexCoord::new(2, 2).on_boundary(4));
        assert!(HexCoord::new(-4, 4).on_boundary(4));
        assert!(!HexCoord::new(3, 0).on_boundary(4));

        assert!(HexCoord::new(3, 1).within(4));
        assert!(!HexCoord::new(3, 2).within(4));
        assert!(!HexCoord::new(5, 0).within(4));
    }

    #[test]
    fn test_hexagon_cardinality() {
        for size in 0..8 {
            let coords = HexCoord::hexagon(size);
            assert_eq!(coords.len(), hexagon_cell_count(size));

            let unique: HashSet<_> = coords.iter().collect();
            assert_eq!(unique.len(), coords.len());
            assert!(coords.iter().all(|c| c.within(size)));
        }
        assert_eq!(hexagon_cell_count(4), 61);
    }
}
