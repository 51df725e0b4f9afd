#![forbid(unsafe_code)]

//! Core: pieces, board geometry, and normalized pointer input.
//!
//! # Role in boardkit
//! `boardkit-core` is the leaf layer. It owns the [`Piece`] data model, the
//! pixel/cell geometry shared by the allocator and the interaction
//! controller, and the device-agnostic [`PointerEvent`] stream that touch
//! input is normalized into.
//!
//! # How it fits in the system
//! `boardkit-layout` places pieces on a grid using these types, and
//! `boardkit-runtime` drives the hold/drag state machine from
//! [`PointerEvent`]s. Nothing in this crate allocates, schedules, or logs.

pub mod error;
pub mod geometry;
pub mod input;
pub mod piece;

pub use error::ConfigError;
pub use geometry::{Cell, Point, Rect};
pub use input::{PointerEvent, PointerEventKind, TouchAdapter, TouchEvent, TouchPhase};
pub use piece::{HolderId, Piece, PieceId};
