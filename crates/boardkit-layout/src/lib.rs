#![forbid(unsafe_code)]

//! Grid geometry and piece placement.
//!
//! [`SpatialAllocator`] derives a grid from board size and cell size,
//! scatters unheld pieces over free cells near a randomized center, and
//! answers the two spatial queries the interaction layer needs: which piece
//! is under a point, and which cell a dropped piece should settle into.

pub mod allocator;
pub mod grid;
pub mod ring;

pub use allocator::SpatialAllocator;
pub use boardkit_core::{Cell, ConfigError, Piece, PieceId, Point, Rect};
pub use grid::{GridConfig, GridGeometry, RawGridConfig};
