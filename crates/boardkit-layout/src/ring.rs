#![forbid(unsafe_code)]

//! Ring search: enumerate empty cells outward from a randomized center.
//!
//! Ring 0 is the center cell. Ring `k` is the border of the `(2k+1)²`
//! square around it: the full top and bottom rows, then the left and right
//! columns without their corners. Each cell appears in exactly one ring.
//!
//! Expansion stops once enough free cells are found or the radius reaches
//! `max(rows, cols)`, beyond which a rectangular grid has no cells left.

use boardkit_core::Cell;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::grid::GridGeometry;

/// Pick the search center.
///
/// Per axis: half the count, rounded up or down with equal probability,
/// minus one. Layouts of the same size therefore do not always cluster on
/// the same cell.
pub fn random_center<R: Rng + ?Sized>(rows: u32, cols: u32, rng: &mut R) -> Cell {
    let mut axis = |count: u32| {
        let half = f64::from(count) / 2.0;
        let rounded = if rng.random_bool(0.5) {
            half.ceil()
        } else {
            half.floor()
        };
        rounded as i32 - 1
    };
    let row = axis(rows);
    let col = axis(cols);
    Cell::new(row, col)
}

/// Cells at Chebyshev distance exactly `radius` from `center`.
pub fn ring(center: Cell, radius: i32) -> impl Iterator<Item = Cell> {
    let Cell { row, col } = center;
    let edge_rows = std::iter::once(row - radius).chain((radius > 0).then_some(row + radius));
    let horizontal =
        edge_rows.flat_map(move |r| (col - radius..=col + radius).map(move |c| Cell::new(r, c)));
    let vertical = (row - radius + 1..=row + radius - 1)
        .flat_map(move |r| [Cell::new(r, col - radius), Cell::new(r, col + radius)]);
    horizontal.chain(vertical)
}

/// Collect at least `max` free cell indices around `center` (fewer only if
/// the grid runs out), skipping indices in `occupied`.
pub fn available_cells_around(
    grid: &GridGeometry,
    center: Cell,
    max: usize,
    occupied: &FxHashSet<usize>,
) -> Vec<usize> {
    let limit = grid.rows().max(grid.cols()) as i32;
    let mut found = Vec::with_capacity(max);
    let mut radius = 0;
    loop {
        found.extend(
            ring(center, radius)
                .filter_map(|cell| grid.index(cell))
                .filter(|index| !occupied.contains(index)),
        );
        if found.len() >= max || radius >= limit {
            break;
        }
        radius += 1;
    }
    found
}

/// Ring search around a freshly randomized center.
pub fn available_cells<R: Rng + ?Sized>(
    grid: &GridGeometry,
    max: usize,
    occupied: &FxHashSet<usize>,
    rng: &mut R,
) -> Vec<usize> {
    let center = random_center(grid.rows(), grid.cols(), rng);
    available_cells_around(grid, center, max, occupied)
}
