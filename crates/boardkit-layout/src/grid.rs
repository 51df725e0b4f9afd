#![forbid(unsafe_code)]

//! Grid geometry derived from board size and cell size.
//!
//! # Invariants
//!
//! 1. `rows = height / cell_size` and `cols = width / cell_size` (floor).
//! 2. `capacity == rows * cols`.
//! 3. A cell has a linear index `row * cols + col` iff it lies in
//!    `[0, rows) × [0, cols)`; the two addressings round-trip.

use boardkit_core::{Cell, ConfigError};
use serde::{Deserialize, Serialize};

fn default_dispersion() -> u32 {
    1
}

/// Validated allocator configuration, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    /// Side of one square cell. Must be at least 1.
    pub cell_size: u32,
    /// How many candidate cells to search per piece placed. `1` packs
    /// pieces tightly around the center; larger values scatter them.
    #[serde(default = "default_dispersion")]
    pub dispersion: u32,
}

impl GridConfig {
    #[must_use]
    pub const fn new(width: u32, height: u32, cell_size: u32, dispersion: u32) -> Self {
        Self {
            width,
            height,
            cell_size,
            dispersion,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size < 1 {
            return Err(ConfigError::invalid("cellSize", self.cell_size));
        }
        Ok(())
    }
}

/// Allocator configuration as it arrives from an untrusted source (markup
/// attributes, JSON), before integrality and sign are checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGridConfig {
    pub width: f64,
    pub height: f64,
    pub cell_size: f64,
    #[serde(default = "default_raw_dispersion")]
    pub dispersion: f64,
}

fn default_raw_dispersion() -> f64 {
    1.0
}

impl TryFrom<RawGridConfig> for GridConfig {
    type Error = ConfigError;

    fn try_from(raw: RawGridConfig) -> Result<Self, Self::Error> {
        let config = GridConfig {
            width: ConfigError::check_integer("width", raw.width)?,
            height: ConfigError::check_integer("height", raw.height)?,
            cell_size: ConfigError::check_integer("cellSize", raw.cell_size)?,
            dispersion: ConfigError::check_integer("dispersion", raw.dispersion)?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Rows, columns, and capacity of a configured board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridGeometry {
    config: GridConfig,
    rows: u32,
    cols: u32,
}

impl GridGeometry {
    /// Derive the geometry for a configuration.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rows: config.height / config.cell_size,
            cols: config.width / config.cell_size,
        })
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> GridConfig {
        self.config
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.config.cell_size
    }

    #[inline]
    #[must_use]
    pub const fn dispersion(&self) -> u32 {
        self.config.dispersion
    }

    /// Maximum number of pieces the grid can hold.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as u32) < self.rows
            && (cell.col as u32) < self.cols
    }

    /// Linear index of a cell, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.row as usize * self.cols as usize + cell.col as usize)
    }

    /// Cell at a linear index, or `None` past capacity.
    #[inline]
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        if index >= self.capacity() {
            return None;
        }
        let cols = self.cols as usize;
        Some(Cell::new((index / cols) as i32, (index % cols) as i32))
    }
}
