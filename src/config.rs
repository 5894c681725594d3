use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_TAP_TOLERANCE_PX: f32 = 15.0;
pub const DEFAULT_TAP_TIME_MS: u64 = 750;
pub const DEFAULT_DOUBLE_TAP_TIME_MS: u64 = 750;
pub const DEFAULT_SWIPE_TIME_MS: u64 = 500;
pub const DEFAULT_SWIPE_MIN_TRAVEL_PX: f32 = 200.0;

/// Timing and spatial tolerances shared by every detector on a surface.
///
/// The tolerance radius varies between deployments (10, 15 and 130 px have
/// all been used), so it is tunable rather than fixed.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Max drift from the anchor before a press counts as movement.
    pub tap_tolerance_px: f32,
    /// Budget from anchor acceptance to full release for a tap.
    pub tap_time_ms: u64,
    /// Window after the first tap in which the second must complete.
    pub double_tap_time_ms: u64,
    /// Hard cutoff for a swipe continuation, measured from anchor acceptance.
    pub swipe_time_ms: u64,
    /// Centroid travel a swipe must strictly exceed.
    pub swipe_min_travel_px: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_tolerance_px: DEFAULT_TAP_TOLERANCE_PX,
            tap_time_ms: DEFAULT_TAP_TIME_MS,
            double_tap_time_ms: DEFAULT_DOUBLE_TAP_TIME_MS,
            swipe_time_ms: DEFAULT_SWIPE_TIME_MS,
            swipe_min_travel_px: DEFAULT_SWIPE_MIN_TRAVEL_PX,
        }
    }
}

impl GestureConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GestureConfig =
            toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tap_tolerance_px.is_finite() || self.tap_tolerance_px <= 0.0 {
            return Err(ConfigError::Validation(
                "tap_tolerance_px must be a positive finite number".into(),
            ));
        }
        if self.tap_time_ms == 0 {
            return Err(ConfigError::Validation("tap_time_ms must be > 0".into()));
        }
        if self.double_tap_time_ms == 0 {
            return Err(ConfigError::Validation(
                "double_tap_time_ms must be > 0".into(),
            ));
        }
        if self.swipe_time_ms == 0 {
            return Err(ConfigError::Validation("swipe_time_ms must be > 0".into()));
        }
        if !self.swipe_min_travel_px.is_finite() || self.swipe_min_travel_px <= 0.0 {
            return Err(ConfigError::Validation(
                "swipe_min_travel_px must be a positive finite number".into(),
            ));
        }
        Ok(())
    }

    pub fn tap_tolerance_sq(&self) -> f32 {
        self.tap_tolerance_px * self.tap_tolerance_px
    }

    pub fn swipe_min_travel_sq(&self) -> f32 {
        self.swipe_min_travel_px * self.swipe_min_travel_px
    }
}

#[cfg(test)]
mod tests;
