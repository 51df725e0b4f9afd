#![forbid(unsafe_code)]

//! Board-level feature toggles and settings loading.
//!
//! [`BoardConfig`] is consumed by the interaction controller (dragging,
//! holding, hold duration, movement threshold) and by the allocator
//! (rotation). [`BoardSettings`] bundles it with the grid configuration so
//! a whole board can be described in one JSON or TOML document:
//!
//! ```toml
//! [grid]
//! width = 500
//! height = 500
//! cellSize = 100
//! dispersion = 2
//!
//! [board]
//! holdingDisabled = false
//! holdDurationMs = 375
//! ```

use boardkit_core::ConfigError;
use boardkit_layout::GridConfig;
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Default hold duration in milliseconds.
pub const DEFAULT_HOLD_DURATION_MS: u64 = 375;

/// Default movement (pixels, per axis) before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 3.0;

/// Feature toggles for a board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    pub dragging_disabled: bool,
    pub holding_disabled: bool,
    pub rotating_disabled: bool,
    /// How long a stationary press must last to toggle a hold.
    pub hold_duration_ms: u64,
    /// Per-axis movement in pixels that promotes a press to a drag.
    pub drag_threshold: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            dragging_disabled: false,
            holding_disabled: false,
            rotating_disabled: false,
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

impl BoardConfig {
    #[inline]
    #[must_use]
    pub const fn dragging_enabled(&self) -> bool {
        !self.dragging_disabled
    }

    #[inline]
    #[must_use]
    pub const fn holding_enabled(&self) -> bool {
        !self.holding_disabled
    }

    #[inline]
    #[must_use]
    pub const fn rotating_enabled(&self) -> bool {
        !self.rotating_disabled
    }

    #[inline]
    #[must_use]
    pub const fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_duration_ms == 0 {
            return Err(ConfigError::invalid("holdDurationMs", self.hold_duration_ms));
        }
        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            return Err(ConfigError::invalid("dragThreshold", self.drag_threshold));
        }
        Ok(())
    }
}

/// Grid and board configuration together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSettings {
    pub grid: GridConfig,
    pub board: BoardConfig,
}

impl BoardSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.board.validate()
    }
}

#[cfg(feature = "config-files")]
mod files {
    use super::{BoardConfig, BoardSettings};
    use boardkit_core::ConfigError;
    use boardkit_layout::{GridConfig, RawGridConfig};
    use serde::Deserialize;
    use thiserror::Error;

    /// Errors that can occur when loading board settings.
    #[derive(Debug, Error)]
    pub enum ConfigLoadError {
        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("TOML error: {0}")]
        Toml(#[from] toml::de::Error),

        #[error(transparent)]
        Invalid(#[from] ConfigError),
    }

    #[derive(Deserialize)]
    struct SettingsFile {
        grid: RawGridConfig,
        #[serde(default)]
        board: BoardConfig,
    }

    impl TryFrom<SettingsFile> for BoardSettings {
        type Error = ConfigError;

        fn try_from(file: SettingsFile) -> Result<Self, Self::Error> {
            let settings = BoardSettings {
                grid: GridConfig::try_from(file.grid)?,
                board: file.board,
            };
            settings.validate()?;
            Ok(settings)
        }
    }

    impl BoardSettings {
        /// Parse settings from a JSON document.
        pub fn from_json_str(s: &str) -> Result<Self, ConfigLoadError> {
            let file: SettingsFile = serde_json::from_str(s)?;
            Ok(Self::try_from(file)?)
        }

        /// Parse settings from a TOML document.
        pub fn from_toml_str(s: &str) -> Result<Self, ConfigLoadError> {
            let file: SettingsFile = toml::from_str(s)?;
            Ok(Self::try_from(file)?)
        }
    }
}

#[cfg(feature = "config-files")]
pub use files::ConfigLoadError;
