//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! frame_rate = 120
//!
//! [graph_momentum]
//! velocity_threshold = 200
//!
//! [scroll_momentum]
//! duration = 50
//!
//! [media]
//! cache_capacity = 64
//! ```
//!
//! Every key is optional. A momentum table only overrides the keys it names;
//! the rest keep that consumer's defaults.

use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::error::EngineError;
use crate::momentum::MomentumConfig;

const DEFAULT_FRAME_RATE: f64 = 60.0;
const DEFAULT_MEDIA_CACHE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Ticks per second driving graph time.
    pub frame_rate: f64,
    pub graph_momentum: MomentumConfig,
    pub scroll_momentum: MomentumConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub cache_capacity: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_MEDIA_CACHE_CAPACITY,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            graph_momentum: MomentumConfig::graph(),
            scroll_momentum: MomentumConfig::scroll(),
            media: MediaConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MomentumOverrides {
    velocity_threshold: Option<f64>,
    duration: Option<f64>,
    min_velocity_magnitude: Option<f64>,
    max_velocity_magnitude: Option<f64>,
    damp_factor: Option<f64>,
    amplitude_minimum: Option<f64>,
}

impl MomentumOverrides {
    fn apply(self, mut base: MomentumConfig) -> MomentumConfig {
        if let Some(v) = self.velocity_threshold {
            base.velocity_threshold = v;
        }
        if let Some(v) = self.duration {
            base.duration = v;
        }
        if let Some(v) = self.min_velocity_magnitude {
            base.min_velocity_magnitude = v;
        }
        if let Some(v) = self.max_velocity_magnitude {
            base.max_velocity_magnitude = v;
        }
        if let Some(v) = self.damp_factor {
            base.damp_factor = v;
        }
        if let Some(v) = self.amplitude_minimum {
            base.amplitude_minimum = v;
        }
        base
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    frame_rate: Option<f64>,
    #[serde(default)]
    graph_momentum: MomentumOverrides,
    #[serde(default)]
    scroll_momentum: MomentumOverrides,
    #[serde(default)]
    media: MediaConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let raw: RawEngineConfig = toml::from_str(text)?;
        let config = Self {
            frame_rate: raw.frame_rate.unwrap_or(DEFAULT_FRAME_RATE),
            graph_momentum: raw.graph_momentum.apply(MomentumConfig::graph()),
            scroll_momentum: raw.scroll_momentum.apply(MomentumConfig::scroll()),
            media: raw.media,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Like [`EngineConfig::load`], falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(EngineError::invalid_argument(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        for (name, momentum) in [
            ("graph_momentum", &self.graph_momentum),
            ("scroll_momentum", &self.scroll_momentum),
        ] {
            if momentum.damp_factor == 0.0 {
                return Err(EngineError::invalid_argument(format!(
                    "{}.damp_factor must be non-zero",
                    name
                )));
            }
            if momentum.min_velocity_magnitude > momentum.max_velocity_magnitude {
                return Err(EngineError::invalid_argument(format!(
                    "{}: min_velocity_magnitude exceeds max_velocity_magnitude",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_momentum_table_keeps_consumer_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            frame_rate = 30
            [scroll_momentum]
            duration = 50
            [media]
            cache_capacity = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.frame_rate, 30.0);
        assert_eq!(config.scroll_momentum.velocity_threshold, 40.0);
        assert_eq!(config.scroll_momentum.duration, 50.0);
        assert_eq!(config.graph_momentum, MomentumConfig::graph());
        assert_eq!(config.media.cache_capacity, 4);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("frame_rate = 0"),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[graph_momentum]\nvelocity = 3"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = EngineConfig::load_or_default("/nonexistent/patchflow.toml");
        assert_eq!(config, EngineConfig::default());
    }
}
