//! Runtime viewer configuration loaded from `assets/config/community.viewer.json`.

use bevy::prelude::*;
use constants::camera_presets::{
    DEFAULT_FLIGHT_SECS, FLAT_FLOOR_OFFSET_UNIT, SETTLE_MOVE_SECS, STEPPED_FLOOR_OFFSET_UNIT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH: &str = "config/community.viewer.json";
pub const DEFAULT_MODEL_PATH: &str = "model/model.glb";

/// How floors above the selected one are lifted in the explode view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FloorOffset {
    /// Every floor above the target rises by the same `unit`.
    Flat { unit: f32 },
    /// Floors rise by `unit` per floor of distance from the target.
    Stepped { unit: f32 },
}

impl FloorOffset {
    pub fn unit(self) -> f32 {
        match self {
            Self::Flat { unit } | Self::Stepped { unit } => unit,
        }
    }

    /// Target height for a floor `floors_above` levels over the selected floor.
    pub fn lifted(self, initial_y: f32, floors_above: u32) -> f32 {
        if floors_above == 0 {
            return initial_y;
        }
        match self {
            Self::Flat { unit } => initial_y + unit,
            Self::Stepped { unit } => initial_y + floors_above as f32 * unit,
        }
    }

    pub fn stepped() -> Self {
        Self::Stepped {
            unit: STEPPED_FLOOR_OFFSET_UNIT,
        }
    }
}

impl Default for FloorOffset {
    fn default() -> Self {
        Self::Flat {
            unit: FLAT_FLOOR_OFFSET_UNIT,
        }
    }
}

#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub model_path: String,
    pub floor_offset: FloorOffset,
    pub flight_seconds: f32,
    pub settle_seconds: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.to_string(),
            floor_offset: FloorOffset::default(),
            flight_seconds: DEFAULT_FLIGHT_SECS,
            settle_seconds: SETTLE_MOVE_SECS,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("model path is empty")]
    EmptyModelPath,
    #[error("floor offset unit must be a positive finite number, got {0}")]
    InvalidFloorOffset(f32),
    #[error("{field} must be a positive finite number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f32 },
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.trim().is_empty() {
            return Err(ConfigError::EmptyModelPath);
        }
        let unit = self.floor_offset.unit();
        if !unit.is_finite() || unit <= 0.0 {
            return Err(ConfigError::InvalidFloorOffset(unit));
        }
        check_duration("flight_seconds", self.flight_seconds)?;
        check_duration("settle_seconds", self.settle_seconds)?;
        Ok(())
    }
}

fn check_duration(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "floor_offset": { "mode": "stepped", "unit": 30.0 } }"#)
                .unwrap();
        assert_eq!(config.model_path, DEFAULT_MODEL_PATH);
        assert_eq!(config.floor_offset, FloorOffset::Stepped { unit: 30.0 });
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = ViewerConfig::default();
        config.floor_offset = FloorOffset::Flat { unit: -1.0 };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFloorOffset(-1.0)));

        let mut config = ViewerConfig::default();
        config.flight_seconds = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { field: "flight_seconds", .. })
        ));

        let mut config = ViewerConfig::default();
        config.model_path = "  ".into();
        assert_eq!(config.validate(), Err(ConfigError::EmptyModelPath));
    }

    #[test]
    fn offsets_lift_only_floors_above() {
        let flat = FloorOffset::Flat { unit: 25.0 };
        assert_eq!(flat.lifted(3.0, 0), 3.0);
        assert_eq!(flat.lifted(3.0, 1), 28.0);
        assert_eq!(flat.lifted(3.0, 4), 28.0);

        let stepped = FloorOffset::Stepped { unit: 30.0 };
        assert_eq!(stepped.lifted(3.0, 2), 63.0);
    }
}
