#![forbid(unsafe_code)]

//! The movable, rotatable token placed on a board.

use std::fmt;

use crate::geometry::{Cell, Point};

/// Stable identity of a piece on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceId(pub u64);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The party holding a piece.
///
/// There is no built-in "system" holder; callers construct the default
/// actor explicitly and pass it where one is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HolderId(pub u64);

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "holder {}", self.0)
    }
}

/// A token on the board.
///
/// `position` is the top-left corner of the piece's square footprint and is
/// absent until the piece is first placed. A piece with a holder and a
/// position is exempt from automatic re-placement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    id: PieceId,
    position: Option<Point>,
    rotation: Option<f64>,
    held_by: Option<HolderId>,
}

impl Piece {
    /// A fresh, unplaced, unheld piece.
    #[must_use]
    pub const fn new(id: PieceId) -> Self {
        Self {
            id,
            position: None,
            rotation: None,
            held_by: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.set_rotation(Some(degrees));
        self
    }

    #[must_use]
    pub fn with_holder(mut self, holder: HolderId) -> Self {
        self.held_by = Some(holder);
        self
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn set_position(&mut self, position: Option<Point>) {
        self.position = position;
    }

    /// Rotation in degrees, normalized to `[0, 360)`.
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> Option<f64> {
        self.rotation
    }

    /// Set the rotation; finite angles are normalized to `[0, 360)`,
    /// non-finite angles clear it.
    pub fn set_rotation(&mut self, degrees: Option<f64>) {
        self.rotation = degrees.filter(|d| d.is_finite()).map(normalize_degrees);
    }

    #[inline]
    #[must_use]
    pub const fn held_by(&self) -> Option<HolderId> {
        self.held_by
    }

    pub fn set_held_by(&mut self, holder: Option<HolderId>) {
        self.held_by = holder;
    }

    #[inline]
    #[must_use]
    pub const fn is_held(&self) -> bool {
        self.held_by.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_held_by(&self, holder: HolderId) -> bool {
        self.held_by == Some(holder)
    }

    /// Held and already placed: the allocator leaves such pieces alone.
    #[inline]
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.held_by.is_some() && self.position.is_some()
    }

    /// The grid cell the piece's top-left corner sits in.
    #[must_use]
    pub fn cell(&self, cell_size: u32) -> Option<Cell> {
        self.position.map(|p| p.cell(cell_size))
    }
}

fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if d >= 360.0 { 0.0 } else { d }
}
