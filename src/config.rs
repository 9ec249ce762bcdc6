// src/config.rs
//! Calibration constants for the motion-to-effect pipeline.
//!
//! Every tunable number the pipeline uses lives here, with the values the
//! visualization ships with as defaults. A JSON file may override any subset
//! of fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid calibration: {0}")]
    Invalid(String),
}

/// Tunables for speed mapping, smoothing, and effect propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Per-update wrist displacement (meters) at or below which intensity is 0.
    pub min_speed: f32,
    /// Per-update wrist displacement (meters) at or above which intensity is 1.
    pub max_speed: f32,
    /// Smoothing step used while the target is above the current value.
    pub attack: f32,
    /// Smoothing step used while the target is at or below the current value.
    pub decay: f32,
    /// Multiplier applied before writing intensity into the environment shader.
    pub intensity_headroom: f32,
    /// Particle birth rate (per second) at full intensity.
    pub particle_rate_ceiling: f32,
    /// Intensity above which the particle gradient switches to the charged pair.
    pub charged_threshold: f32,
    /// Half-width of the hysteresis band around `charged_threshold`. 0 disables it.
    pub gradient_dead_band: f32,
    /// Scale of the planar `(x + z, y)` texture projection.
    pub uv_scale: f32,
    /// Opacity applied to every reconstructed mesh.
    pub environment_opacity: f32,
    /// Name of the numeric shader parameter driven by intensity.
    pub intensity_parameter: String,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            min_speed: 0.005,
            max_speed: 0.15,
            attack: 0.3,
            decay: 0.05,
            intensity_headroom: 5.0,
            particle_rate_ceiling: 75.0,
            charged_threshold: 0.8,
            gradient_dead_band: 0.0,
            uv_scale: 0.18,
            environment_opacity: 0.25,
            intensity_parameter: "Intensity".to_string(),
        }
    }
}

impl Calibration {
    /// Loads a (possibly partial) calibration from a JSON file and validates it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cal: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        cal.validate()?;
        Ok(cal)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.min_speed,
            self.max_speed,
            self.attack,
            self.decay,
            self.intensity_headroom,
            self.particle_rate_ceiling,
            self.charged_threshold,
            self.gradient_dead_band,
            self.uv_scale,
            self.environment_opacity,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("all values must be finite".into()));
        }
        if self.min_speed < 0.0 || self.max_speed <= self.min_speed {
            return Err(ConfigError::Invalid(format!(
                "speed range must satisfy 0 <= min_speed < max_speed (got {} .. {})",
                self.min_speed, self.max_speed
            )));
        }
        for (name, f) in [("attack", self.attack), ("decay", self.decay)] {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ConfigError::Invalid(format!("{name} must be in (0, 1], got {f}")));
            }
        }
        if self.intensity_headroom < 0.0 || self.particle_rate_ceiling < 0.0 {
            return Err(ConfigError::Invalid("multipliers must be non-negative".into()));
        }
        if self.gradient_dead_band < 0.0 {
            return Err(ConfigError::Invalid("gradient_dead_band must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.environment_opacity) {
            return Err(ConfigError::Invalid(format!(
                "environment_opacity must be in [0, 1], got {}",
                self.environment_opacity
            )));
        }
        if self.intensity_parameter.is_empty() {
            return Err(ConfigError::Invalid("intensity_parameter must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration() {
        let cal = Calibration::default();
        assert!((cal.min_speed - 0.005).abs() < f32::EPSILON);
        assert!((cal.max_speed - 0.15).abs() < f32::EPSILON);
        assert!((cal.attack - 0.3).abs() < f32::EPSILON);
        assert!((cal.decay - 0.05).abs() < f32::EPSILON);
        assert!((cal.intensity_headroom - 5.0).abs() < f32::EPSILON);
        assert!((cal.particle_rate_ceiling - 75.0).abs() < f32::EPSILON);
        assert!((cal.charged_threshold - 0.8).abs() < f32::EPSILON);
        assert_eq!(cal.gradient_dead_band, 0.0);
        assert_eq!(cal.intensity_parameter, "Intensity");
        assert!(cal.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cal: Calibration = serde_json::from_str(r#"{ "max_speed": 0.3 }"#).unwrap();
        assert!((cal.max_speed - 0.3).abs() < f32::EPSILON);
        assert!((cal.min_speed - 0.005).abs() < f32::EPSILON);
        assert!(cal.validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_speed_range() {
        let cal = Calibration { min_speed: 0.2, max_speed: 0.1, ..Default::default() };
        assert!(matches!(cal.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_factor() {
        let cal = Calibration { decay: 0.0, ..Default::default() };
        assert!(cal.validate().is_err());
    }

    #[test]
    fn test_rejects_opacity_out_of_range() {
        let cal = Calibration { environment_opacity: 1.5, ..Default::default() };
        assert!(cal.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Calibration::from_json_file("/nonexistent/holomesh.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
