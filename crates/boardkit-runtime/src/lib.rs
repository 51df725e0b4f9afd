#![forbid(unsafe_code)]

//! Runtime: the interaction state machine and the board that hosts it.
//!
//! # Role in boardkit
//! `boardkit-runtime` is where pointer input becomes piece mutations.
//! [`InteractionController`] classifies each gesture as a hold, a drag, or
//! nothing, and [`Board`] applies the resulting commands to its pieces,
//! re-runs the allocator, and drives the [`Renderer`].
//!
//! # Time
//! Nothing here reads a clock or spawns a timer. Hosts pass `now` into
//! every input call and poll [`Board::next_deadline`] to know when to call
//! [`Board::tick`].
//!
//! # Feature flags
//! - `config-files`: [`BoardSettings::from_json_str`] and
//!   [`BoardSettings::from_toml_str`].

pub mod board;
pub mod config;
pub mod controller;

pub use board::{Board, BoardNotification, FixedRoster, NullRenderer, Renderer, Roster};
#[cfg(feature = "config-files")]
pub use config::ConfigLoadError;
pub use config::{BoardConfig, BoardSettings, DEFAULT_DRAG_THRESHOLD, DEFAULT_HOLD_DURATION_MS};
pub use controller::{CursorHint, InteractionCommand, InteractionController, InteractionState};
