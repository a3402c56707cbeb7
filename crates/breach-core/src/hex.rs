//! Axial hex-grid coordinates and the fixed-size hex projection.
//!
//! Projection: `x = size·√3·(q + r/2)`, `y = size·1.5·r`.
//! `pixel_to_hex` inverts the projection and rounds through cube coordinates,
//! so `pixel_to_hex(hex_to_pixel(c)) == c` for every integer coordinate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::HEX_SIZE;
use crate::error::ParseHexError;
use crate::types::Point;

/// Axial hex coordinate. Identity key for grid cells and tower placement.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// The six axial neighbour offsets, in fixed order.
pub const AXIAL_DIRECTIONS: [HexCoord; 6] = [
    HexCoord { q: 1, r: 0 },
    HexCoord { q: 1, r: -1 },
    HexCoord { q: 0, r: -1 },
    HexCoord { q: -1, r: 0 },
    HexCoord { q: -1, r: 1 },
    HexCoord { q: 0, r: 1 },
];

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implied third cube coordinate.
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Centre of this cell in pixel space.
    pub fn to_pixel(self) -> Point {
        hex_to_pixel(self.q, self.r)
    }

    /// The cell containing a pixel-space point.
    pub fn from_pixel(point: Point) -> Self {
        pixel_to_hex(point.x, point.y)
    }

    /// The six adjacent cells.
    pub fn neighbors(self) -> [HexCoord; 6] {
        neighbors(self.q, self.r)
    }

    /// Hex-step distance between two cells.
    pub fn distance(self, other: HexCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        dq.max(dr).max(ds)
    }

    /// `"q,r"` mapping key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for HexCoord {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| ParseHexError::MissingSeparator(s.to_string()))?;
        let q = q
            .trim()
            .parse()
            .map_err(|_| ParseHexError::InvalidComponent(q.to_string()))?;
        let r = r
            .trim()
            .parse()
            .map_err(|_| ParseHexError::InvalidComponent(r.to_string()))?;
        Ok(Self { q, r })
    }
}

/// Project an axial coordinate to the centre of its cell in pixel space.
pub fn hex_to_pixel(q: i32, r: i32) -> Point {
    let (q, r) = (q as f64, r as f64);
    let x = HEX_SIZE * 3f64.sqrt() * (q + r / 2.0);
    let y = HEX_SIZE * 1.5 * r;
    Point::new(x, y)
}

/// Find the cell containing a pixel-space point.
pub fn pixel_to_hex(x: f64, y: f64) -> HexCoord {
    let q = (3f64.sqrt() / 3.0 * x - y / 3.0) / HEX_SIZE;
    let r = (2.0 / 3.0 * y) / HEX_SIZE;
    cube_round(q, r)
}

/// Round fractional axial coordinates to the nearest valid hex.
///
/// The axis with the largest rounding error is recomputed from the other two
/// so that `q + r + s == 0` holds.
fn cube_round(q: f64, r: f64) -> HexCoord {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }

    HexCoord::new(rq as i32, rr as i32)
}

/// The six neighbours of `(q, r)` in `AXIAL_DIRECTIONS` order.
pub fn neighbors(q: i32, r: i32) -> [HexCoord; 6] {
    AXIAL_DIRECTIONS.map(|d| HexCoord::new(q + d.q, r + d.r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_origin() {
        assert_eq!(hex_to_pixel(0, 0), Point::ZERO);
    }

    #[test]
    fn projection_matches_layout_formula() {
        let p = hex_to_pixel(2, -3);
        let expected_x = HEX_SIZE * 3f64.sqrt() * (2.0 - 1.5);
        assert!((p.x - expected_x).abs() < 1e-9);
        assert!((p.y - HEX_SIZE * 1.5 * -3.0).abs() < 1e-9);
    }

    #[test]
    fn pixel_round_trip_is_exact() {
        for q in -40..=40 {
            for r in -40..=40 {
                let p = hex_to_pixel(q, r);
                assert_eq!(pixel_to_hex(p.x, p.y), HexCoord::new(q, r));
                let back = HexCoord::from_pixel(p).to_pixel();
                assert_eq!(back, p);
            }
        }
    }

    #[test]
    fn points_near_a_centre_round_to_that_cell() {
        let centre = hex_to_pixel(3, -2);
        for (dx, dy) in [(10.0, 0.0), (-10.0, 5.0), (0.0, -15.0), (12.0, 12.0)] {
            assert_eq!(pixel_to_hex(centre.x + dx, centre.y + dy), HexCoord::new(3, -2));
        }
    }

    #[test]
    fn neighbors_are_adjacent_and_distinct() {
        let c = HexCoord::new(-4, 7);
        let ns = c.neighbors();
        for (i, n) in ns.iter().enumerate() {
            assert_eq!(c.distance(*n), 1);
            assert!(!ns[i + 1..].contains(n));
        }
        assert_eq!(ns[0], HexCoord::new(-3, 7));
        assert_eq!(ns[5], HexCoord::new(-4, 8));
    }

    #[test]
    fn key_round_trips_through_from_str() {
        let c = HexCoord::new(-12, 5);
        assert_eq!(c.key(), "-12,5");
        assert_eq!("-12,5".parse::<HexCoord>().unwrap(), c);
        assert!("12;5".parse::<HexCoord>().is_err());
        assert!("a,5".parse::<HexCoord>().is_err());
    }
}
