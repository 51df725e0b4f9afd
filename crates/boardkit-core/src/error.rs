#![forbid(unsafe_code)]

//! Configuration errors shared by every layer.

use thiserror::Error;

use crate::piece::PieceId;

/// Invalid geometry, an over-capacity placement request, or a reference to
/// a piece that is not on the board.
///
/// Raised synchronously by the operation that detected it. The operation is
/// aborted and prior state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("cannot place {requested} pieces: capacity is {capacity}")]
    OverCapacity { requested: usize, capacity: usize },

    #[error("unknown piece: {0}")]
    UnknownPiece(PieceId),
}

impl ConfigError {
    #[must_use]
    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidField {
            field,
            value: value.to_string(),
        }
    }

    /// Validate a configuration value supplied as an untrusted number.
    ///
    /// Accepts finite, non-negative, integral values that fit in a `u32`.
    pub fn check_integer(field: &'static str, value: f64) -> Result<u32, Self> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX)
        {
            return Err(Self::invalid(field, value));
        }
        Ok(value as u32)
    }
}
