#![forbid(unsafe_code)]

//! Spatial allocation: non-overlapping grid placement for pieces.
//!
//! [`SpatialAllocator`] owns the grid geometry and the list of pieces it
//! last placed. [`allocate`](SpatialAllocator::allocate) keeps every held,
//! already-positioned piece where it is and scatters the rest over free
//! cells found by the [ring search](crate::ring), drawing uniformly without
//! replacement.
//!
//! # Invariants
//!
//! 1. `allocate` returns every input piece exactly once.
//! 2. No two newly placed pieces share a cell, and none lands on a cell held
//!    by a fixed piece.
//! 3. A rejected `configure` or `allocate` leaves the allocator unchanged.
//! 4. After [`realign_fixed`](SpatialAllocator::realign_fixed), every fixed
//!    piece sits on a distinct cell origin of the current grid.
//!
//! # Failure Modes
//!
//! - Over-capacity requests and invalid geometry fail with [`ConfigError`].
//! - [`hit_test`](SpatialAllocator::hit_test) and
//!   [`snap_to`](SpatialAllocator::snap_to) never fail; "nothing there" is
//!   `None`.

use boardkit_core::{Cell, ConfigError, Piece, PieceId, Point, Rect};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use crate::grid::{GridConfig, GridGeometry};
use crate::ring;

/// Assigns grid cells to pieces and answers spatial queries about them.
#[derive(Clone)]
pub struct SpatialAllocator {
    grid: GridGeometry,
    rotation_enabled: bool,
    placed: Vec<Piece>,
    rng: SmallRng,
}

impl std::fmt::Debug for SpatialAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialAllocator")
            .field("rows", &self.grid.rows())
            .field("cols", &self.grid.cols())
            .field("placed", &self.placed.len())
            .finish()
    }
}

impl SpatialAllocator {
    /// Create an allocator seeded from OS entropy.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::from_os_rng())
    }

    /// Create an allocator with a fixed seed, for reproducible layouts.
    pub fn with_seed(config: GridConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: GridConfig, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Self {
            grid: GridGeometry::new(config)?,
            rotation_enabled: true,
            placed: Vec::new(),
            rng,
        })
    }

    /// Reconfigure the grid. Rows, columns, and capacity are recomputed.
    ///
    /// Already placed pieces keep their positions until the next
    /// [`allocate`](Self::allocate). Held pieces keep them even then; call
    /// [`realign_fixed`](Self::realign_fixed) to move them onto the new grid.
    pub fn configure(
        &mut self,
        width: u32,
        height: u32,
        cell_size: u32,
        dispersion: u32,
    ) -> Result<(), ConfigError> {
        self.set_config(GridConfig::new(width, height, cell_size, dispersion))
    }

    pub fn set_config(&mut self, config: GridConfig) -> Result<(), ConfigError> {
        let grid = GridGeometry::new(config).inspect_err(|err| {
            warn!(error = %err, "rejected grid configuration");
        })?;
        self.grid = grid;
        debug!(
            rows = grid.rows(),
            cols = grid.cols(),
            capacity = grid.capacity(),
            "grid configured"
        );
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> GridConfig {
        self.grid.config()
    }

    #[inline]
    #[must_use]
    pub fn maximum_capacity(&self) -> usize {
        self.grid.capacity()
    }

    #[inline]
    #[must_use]
    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    /// When disabled, `allocate` leaves each piece's rotation as it was.
    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.rotation_enabled = enabled;
    }

    /// Place every piece that is not both held and positioned.
    ///
    /// Returns held pieces first, then the newly placed ones, and remembers
    /// the result for hit testing and snapping.
    pub fn allocate(&mut self, pieces: Vec<Piece>) -> Result<Vec<Piece>, ConfigError> {
        let requested = pieces.len();
        let capacity = self.grid.capacity();
        if requested > capacity {
            warn!(requested, capacity, "placement request exceeds capacity");
            return Err(ConfigError::OverCapacity {
                requested,
                capacity,
            });
        }

        let cell_size = self.grid.cell_size();
        let (fixed, mut to_place): (Vec<Piece>, Vec<Piece>) =
            pieces.into_iter().partition(Piece::is_fixed);

        let occupied: FxHashSet<usize> = fixed
            .iter()
            .filter_map(|p| p.cell(cell_size))
            .filter_map(|cell| self.grid.index(cell))
            .collect();

        let budget = requested
            .saturating_mul(self.grid.dispersion() as usize)
            .max(to_place.len())
            .min(capacity);
        let candidates = ring::available_cells(&self.grid, budget, &occupied, &mut self.rng);
        if candidates.len() < to_place.len() {
            warn!(
                requested,
                free = candidates.len(),
                "not enough free cells for unheld pieces"
            );
            return Err(ConfigError::OverCapacity {
                requested,
                capacity: occupied.len() + candidates.len(),
            });
        }

        let picks = rand::seq::index::sample(&mut self.rng, candidates.len(), to_place.len());
        for (piece, pick) in to_place.iter_mut().zip(picks.iter()) {
            let Some(cell) = self.grid.cell_at(candidates[pick]) else {
                continue;
            };
            piece.set_position(Some(cell.origin(cell_size)));
            if self.rotation_enabled {
                piece.set_rotation(Some(self.rng.random_range(0.0..360.0)));
            }
            trace!(piece = %piece.id(), row = cell.row, col = cell.col, "placed");
        }

        debug!(
            fixed = fixed.len(),
            placed = to_place.len(),
            candidates = candidates.len(),
            "allocated"
        );

        let mut out = fixed;
        out.append(&mut to_place);
        self.placed.clone_from(&out);
        Ok(out)
    }

    /// The pieces returned by the last `allocate`, with any positions
    /// committed since.
    #[inline]
    #[must_use]
    pub fn placed(&self) -> &[Piece] {
        &self.placed
    }

    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.placed.iter().find(|p| p.id() == id)
    }

    /// Direct access for committing a drop or a hold change.
    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.placed.iter_mut().find(|p| p.id() == id)
    }

    /// Forget a placed piece, handing it back.
    pub fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let index = self.placed.iter().position(|p| p.id() == id)?;
        Some(self.placed.remove(index))
    }

    /// The first placed piece whose square footprint contains `point`,
    /// edges included.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<&Piece> {
        let size = f64::from(self.grid.cell_size());
        self.placed.iter().find(|piece| {
            piece
                .position()
                .is_some_and(|pos| Rect::square(pos, size).contains(point))
        })
    }

    /// Resolve a drop point (the dragged piece's top-left corner) to the
    /// free cell it overlaps most.
    ///
    /// Candidates are the cell containing `point` and its right, lower, and
    /// lower-right neighbours, evaluated in that order; the first maximum
    /// wins. Cells outside the grid, and cells occupied by any piece other
    /// than `excluding`, are skipped. Returns the winning cell's top-left
    /// corner, or `None` if every candidate was skipped.
    #[must_use]
    pub fn snap_to(&self, point: Point, excluding: Option<PieceId>) -> Option<Point> {
        best_overlap(&self.grid, point, |cell| self.is_occupied(cell, excluding))
            .map(|cell| cell.origin(self.grid.cell_size()))
    }

    /// Move every fixed piece onto a cell origin of the current grid.
    ///
    /// Pieces are visited in list order. Each snaps to the cell its
    /// footprint overlaps most among those not already claimed by an
    /// earlier fixed piece. A piece with no such cell loses its position and
    /// is placed by the next `allocate`, still held. Returns how many pieces
    /// moved.
    pub fn realign_fixed(&mut self) -> usize {
        let grid = self.grid;
        let cell_size = grid.cell_size();
        let mut claimed: FxHashSet<usize> = FxHashSet::default();
        let mut moved = 0;

        for piece in self.placed.iter_mut().filter(|p| p.is_fixed()) {
            let Some(pos) = piece.position() else {
                continue;
            };
            let target = best_overlap(&grid, pos, |cell| {
                grid.index(cell).is_some_and(|i| claimed.contains(&i))
            });
            match target {
                Some(cell) => {
                    if let Some(index) = grid.index(cell) {
                        claimed.insert(index);
                    }
                    let origin = cell.origin(cell_size);
                    if origin != pos {
                        trace!(piece = %piece.id(), row = cell.row, col = cell.col, "realigned");
                        piece.set_position(Some(origin));
                        moved += 1;
                    }
                }
                None => {
                    trace!(piece = %piece.id(), "no cell left, unplaced");
                    piece.set_position(None);
                    moved += 1;
                }
            }
        }
        if moved > 0 {
            debug!(moved, "fixed pieces realigned");
        }
        moved
    }

    fn is_occupied(&self, cell: Cell, excluding: Option<PieceId>) -> bool {
        let cell_size = self.grid.cell_size();
        self.placed
            .iter()
            .any(|p| Some(p.id()) != excluding && p.cell(cell_size) == Some(cell))
    }
}

/// The in-grid cell that a square footprint at `point` overlaps most.
///
/// Candidates are the cell containing `point` and its right, lower, and
/// lower-right neighbours, in that order; the first maximum wins.
fn best_overlap(
    grid: &GridGeometry,
    point: Point,
    mut blocked: impl FnMut(Cell) -> bool,
) -> Option<Cell> {
    let cell_size = grid.cell_size();
    let footprint = Rect::square(point, f64::from(cell_size));
    let corner = point.cell(cell_size);
    let candidates = [corner, corner.right(), corner.below(), corner.below().right()];

    let mut best: Option<(Cell, f64)> = None;
    for cell in candidates {
        if !grid.contains(cell) || blocked(cell) {
            continue;
        }
        let area = footprint.overlap_area(&cell.bounds(cell_size));
        if best.is_none_or(|(_, best_area)| area > best_area) {
            best = Some((cell, area));
        }
    }
    best.map(|(cell, _)| cell)
}
