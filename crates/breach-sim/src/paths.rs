//! Grid bounds and the fixed ingress routes.
//!
//! Two routes exist. Every difficulty walks the "standard ingress"; dual-path
//! difficulties also open the "lateral flank". Paths never change after the
//! engine is built, so waypoint pixels are projected once up front.

use breach_core::constants::{GRID_COLS, GRID_ROWS};
use breach_core::enums::Difficulty;
use breach_core::hex::HexCoord;
use breach_core::types::Point;

/// Whether a cell is inside the placeable grid.
pub fn in_grid(coord: HexCoord) -> bool {
    (-GRID_COLS / 2..GRID_COLS / 2).contains(&coord.q)
        && (-GRID_ROWS / 2..GRID_ROWS / 2).contains(&coord.r)
}

/// Every placeable cell, column by column.
pub fn grid_cells() -> impl Iterator<Item = HexCoord> {
    (-GRID_COLS / 2..GRID_COLS / 2)
        .flat_map(|q| (-GRID_ROWS / 2..GRID_ROWS / 2).map(move |r| HexCoord::new(q, r)))
}

fn run_q(path: &mut Vec<HexCoord>, qs: impl Iterator<Item = i32>, r: i32) {
    path.extend(qs.map(|q| HexCoord::new(q, r)));
}

fn run_r(path: &mut Vec<HexCoord>, q: i32, rs: impl Iterator<Item = i32>) {
    path.extend(rs.map(|r| HexCoord::new(q, r)));
}

/// Path A: the standard ingress.
pub fn standard_ingress() -> Vec<HexCoord> {
    let mut path = Vec::new();
    run_q(&mut path, -12..-8, 0);
    run_r(&mut path, -8, 0..4);
    run_q(&mut path, -8..-4, 4);
    run_r(&mut path, -4, (-3..=4).rev());
    run_q(&mut path, -4..4, -4);
    run_r(&mut path, 4, -4..4);
    run_q(&mut path, 4..8, 4);
    run_r(&mut path, 8, (1..=4).rev());
    run_q(&mut path, 8..12, 0);
    path
}

/// Path B: the lateral flank.
pub fn lateral_flank() -> Vec<HexCoord> {
    let mut path = Vec::new();
    run_q(&mut path, -12..-10, -5);
    run_r(&mut path, -10, -5..-2);
    run_q(&mut path, -10..-2, -2);
    run_r(&mut path, -2, -2..2);
    run_q(&mut path, -2..6, 2);
    run_r(&mut path, 6, (-1..=2).rev());
    run_q(&mut path, 6..12, 0);
    path
}

/// The routes available to spawns under one difficulty.
#[derive(Debug, Clone)]
pub struct PathSet {
    paths: Vec<Vec<HexCoord>>,
    pixels: Vec<Vec<Point>>,
}

impl PathSet {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let mut paths = vec![standard_ingress()];
        if difficulty.def().dual_path || difficulty == Difficulty::Nightmare {
            paths.push(lateral_flank());
        }
        let pixels = paths
            .iter()
            .map(|path| path.iter().map(|c| c.to_pixel()).collect())
            .collect();
        Self { paths, pixels }
    }

    /// Number of active paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[Vec<HexCoord>] {
        &self.paths
    }

    /// Waypoint count of one path (0 for an unknown id).
    pub fn waypoint_count(&self, path_id: usize) -> usize {
        self.pixels.get(path_id).map_or(0, Vec::len)
    }

    /// Pixel centre of a waypoint.
    pub fn waypoint(&self, path_id: usize, index: usize) -> Option<Point> {
        self.pixels.get(path_id)?.get(index).copied()
    }

    pub fn is_on_active_path(&self, coord: HexCoord) -> bool {
        self.paths.iter().any(|path| path.contains(&coord))
    }

    /// The active waypoint closest to a point, as `(path_id, index)`.
    pub fn nearest_waypoint(&self, point: Point) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;
        for (path_id, pixels) in self.pixels.iter().enumerate() {
            for (index, waypoint) in pixels.iter().enumerate() {
                let d = waypoint.distance_squared(point);
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some(((path_id, index), d));
                }
            }
        }
        best.map(|(found, _)| found)
    }
}
