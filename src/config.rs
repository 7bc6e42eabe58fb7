//! Conversion settings, loadable from a TOML file.
//!
//! ```toml
//! frame_time = 0.008333
//! rotations_in_radians = true
//! fields_per_joint = 12
//! short_rows = "reject"
//! range_policy = "clamp"
//!
//! [coordinates]
//! scale = 100.0
//! ```

use crate::capture::CaptureLayout;
use crate::error::{BvhError, Result};
use crate::normalize::CoordinateMapping;
use crate::parse::{ParseOptions, ShortRowPolicy};
use crate::query::RangePolicy;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_FRAME_TIME: f64 = 1.0 / 30.0;

/// Columns per joint in a capture table: X Y Z Length vX vY vZ vAbs aX aY aZ aAbs.
pub const DEFAULT_FIELDS_PER_JOINT: usize = 12;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Seconds per frame of the capture.
    pub frame_time: f64,
    /// Capture rotation columns are radians (converted to degrees for BVH).
    pub rotations_in_radians: bool,
    pub fields_per_joint: usize,
    pub short_rows: ShortRowPolicy,
    pub range_policy: RangePolicy,
    pub coordinates: CoordinateMapping,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            frame_time: DEFAULT_FRAME_TIME,
            rotations_in_radians: true,
            fields_per_joint: DEFAULT_FIELDS_PER_JOINT,
            short_rows: ShortRowPolicy::default(),
            range_policy: RangePolicy::default(),
            coordinates: CoordinateMapping::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(text).map_err(|err| BvhError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded config from {:?}", path);
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.frame_time.is_finite() || self.frame_time <= 0.0 {
            return Err(BvhError::Config(format!(
                "frame_time must be a positive number of seconds, got {}",
                self.frame_time
            )));
        }
        CaptureLayout::new(self.fields_per_joint)?;
        if !self.coordinates.scale.is_finite() {
            return Err(BvhError::Config(format!(
                "coordinate scale must be finite, got {}",
                self.coordinates.scale
            )));
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            short_rows: self.short_rows,
        }
    }
}
