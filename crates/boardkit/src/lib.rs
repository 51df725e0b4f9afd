#![forbid(unsafe_code)]

//! Boardkit public facade crate.
//!
//! Re-exports the piece model, the spatial allocator, and the interaction
//! runtime, plus a prelude for day-to-day use.
//!
//! ```
//! use boardkit::prelude::*;
//!
//! let settings = BoardSettings {
//!     grid: GridConfig::new(500, 500, 100, 1),
//!     board: BoardConfig::default(),
//! };
//! let mut board = Board::new(settings, FixedRoster(HolderId(1)), NullRenderer)?;
//! board.add_piece(Piece::new(PieceId(1)))?;
//! assert!(board.piece(PieceId(1)).and_then(Piece::position).is_some());
//! # Ok::<(), ConfigError>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use boardkit_core::{
    Cell, ConfigError, HolderId, Piece, PieceId, Point, PointerEvent, PointerEventKind, Rect,
    TouchAdapter, TouchEvent, TouchPhase,
};

// --- Layout re-exports -----------------------------------------------------

pub use boardkit_layout::{GridConfig, GridGeometry, RawGridConfig, SpatialAllocator};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "config-files")]
pub use boardkit_runtime::ConfigLoadError;
pub use boardkit_runtime::{
    Board, BoardConfig, BoardNotification, BoardSettings, CursorHint, FixedRoster,
    InteractionCommand, InteractionController, InteractionState, NullRenderer, Renderer, Roster,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Board, BoardConfig, BoardNotification, BoardSettings, ConfigError, CursorHint,
        FixedRoster, GridConfig, HolderId, NullRenderer, Piece, PieceId, Point, PointerEvent,
        Renderer, Roster,
    };

    pub use crate::{core, layout, runtime};
}

pub use boardkit_core as core;
pub use boardkit_layout as layout;
pub use boardkit_runtime as runtime;
