//! Data-driven game balance
//!
//! Everything a designer might want to tweak without recompiling: pursuit
//! speed, checkpoint table and spawn tables. Loaded from JSON; missing
//! fields fall back to the built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Inclusive spawn delay range in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnInterval {
    pub min_ms: u32,
    pub max_ms: u32,
}

impl SpawnInterval {
    pub const fn new(min_ms: u32, max_ms: u32) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Inclusive horizontal spawn window beyond the right screen edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnWindow {
    pub min_px: u32,
    pub max_px: u32,
}

impl SpawnWindow {
    pub const fn new(min_px: u32, max_px: u32) -> Self {
        Self { min_px, max_px }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Avalanche advance, px/frame
    pub avalanche_speed: f32,
    /// World distances (chunks) at which beacons spawn, ascending
    pub checkpoint_distances: Vec<f64>,
    pub max_obstacles_on_screen: usize,
    /// Level 1 obstacle cadence and mix
    pub obstacle_interval: SpawnInterval,
    pub ice_weight: f32,
    pub satellite_weight: f32,
    pub ice_window: SpawnWindow,
    pub satellite_window: SpawnWindow,
    /// Level 2 cadence and mix per obstacle type
    pub bug_weight: f32,
    pub crystal_weight: f32,
    pub bug_interval: SpawnInterval,
    pub crystal_interval: SpawnInterval,
    pub bug_window: SpawnWindow,
    pub crystal_window: SpawnWindow,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            avalanche_speed: 0.12,
            checkpoint_distances: vec![60.0, 140.0, 220.0, 300.0],
            max_obstacles_on_screen: 4,
            obstacle_interval: SpawnInterval::new(1800, 3200),
            ice_weight: 0.6,
            satellite_weight: 0.4,
            ice_window: SpawnWindow::new(80, 300),
            satellite_window: SpawnWindow::new(400, 600),
            bug_weight: 0.5,
            crystal_weight: 0.5,
            bug_interval: SpawnInterval::new(1400, 2600),
            crystal_interval: SpawnInterval::new(2000, 3500),
            bug_window: SpawnWindow::new(70, 200),
            crystal_window: SpawnWindow::new(150, 450),
        }
    }
}

impl Tuning {
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !self.avalanche_speed.is_finite() || self.avalanche_speed <= 0.0 {
            return Err(TuningError::Invalid(format!(
                "avalanche_speed must be positive, got {}",
                self.avalanche_speed
            )));
        }
        if self.checkpoint_distances.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(TuningError::Invalid(
                "checkpoint distances must be positive".into(),
            ));
        }
        if self.checkpoint_distances.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TuningError::Invalid(
                "checkpoint distances must be strictly ascending".into(),
            ));
        }
        if self.max_obstacles_on_screen == 0 {
            return Err(TuningError::Invalid(
                "max_obstacles_on_screen must be at least 1".into(),
            ));
        }
        for (name, interval) in [
            ("obstacle_interval", self.obstacle_interval),
            ("bug_interval", self.bug_interval),
            ("crystal_interval", self.crystal_interval),
        ] {
            if interval.min_ms > interval.max_ms {
                return Err(TuningError::Invalid(format!("{name}: min_ms > max_ms")));
            }
        }
        for (name, window) in [
            ("ice_window", self.ice_window),
            ("satellite_window", self.satellite_window),
            ("bug_window", self.bug_window),
            ("crystal_window", self.crystal_window),
        ] {
            if window.min_px > window.max_px {
                return Err(TuningError::Invalid(format!("{name}: min_px > max_px")));
            }
        }
        for (name, a, b) in [
            ("ice/satellite", self.ice_weight, self.satellite_weight),
            ("bug/crystal", self.bug_weight, self.crystal_weight),
        ] {
            let weights_ok = a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0 && a + b > 0.0;
            if !weights_ok {
                return Err(TuningError::Invalid(format!(
                    "{name} weights must be non-negative with a positive sum"
                )));
            }
        }
        Ok(())
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoint_distances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let t = Tuning::default();
        assert!(t.validate().is_ok());
        assert_eq!(t.checkpoint_count(), 4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t = Tuning::from_json_str(r#"{ "avalanche_speed": 2.0 }"#).unwrap();
        assert_eq!(t.avalanche_speed, 2.0);
        assert_eq!(t.max_obstacles_on_screen, 4);
        assert_eq!(t.bug_interval, SpawnInterval::new(1400, 2600));
    }

    #[test]
    fn test_rejects_unordered_checkpoints() {
        let err = Tuning::from_json_str(r#"{ "checkpoint_distances": [10, 5] }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let err = Tuning::from_json_str(r#"{ "bug_interval": { "min_ms": 10, "max_ms": 5 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("bug_interval"));
    }

    #[test]
    fn test_rejects_zero_cave_weights() {
        let err = Tuning::from_json_str(r#"{ "bug_weight": 0.0, "crystal_weight": 0.0 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("bug/crystal"));
    }

    #[test]
    fn test_parse_error() {
        let err = Tuning::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TuningError::Io { .. }));
    }
}
