//! Game settings
//!
//! Lane layout, traffic density and driver options. Loaded from a JSON file;
//! every field falls back to the stock game when omitted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::CARS_PER_LANE;
use crate::sim::{Lane, LaneKind, default_lanes};

/// Why a settings file was rejected
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("need at least 2 lanes, got {0}")]
    TooFewLanes(usize),
    #[error("lane at position {index} has id {id}")]
    LaneIdMismatch { index: usize, id: usize },
    #[error("road lane {0} needs a finite non-zero speed")]
    MissingSpeed(usize),
    #[error("grass lane {0} cannot have a speed")]
    UnexpectedSpeed(usize),
    #[error("lane {index} density {density} outside [0, 1]")]
    BadDensity { index: usize, density: f32 },
    #[error("the first lane must be grass")]
    StartNotTraversable,
    #[error("cars_per_lane must be at least 1")]
    NoCars,
    #[error("refresh_hz must be positive, got {0}")]
    BadRefreshRate(f64),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for traffic; random when unset
    pub seed: Option<u64>,
    /// Cars spawned in every road lane per episode
    pub cars_per_lane: usize,
    /// Rows from start (0) to goal (last)
    pub lanes: Vec<Lane>,

    // === Headless driver ===
    /// Simulated display refresh rate
    pub refresh_hz: f64,
    /// Stop after this many episodes
    pub max_episodes: u32,
    /// Hard stop on total frames dispatched
    pub max_frames: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            cars_per_lane: CARS_PER_LANE,
            lanes: default_lanes(),

            refresh_hz: 60.0,
            max_episodes: 5,
            max_frames: 60 * 60 * 5,
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {} ({} lanes)", path.display(), settings.lanes.len());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Seed to use for this run
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Check the lane layout and driver options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lanes.len() < 2 {
            return Err(ConfigError::TooFewLanes(self.lanes.len()));
        }
        if self.lanes[0].kind != LaneKind::Traversable {
            return Err(ConfigError::StartNotTraversable);
        }

        for (index, lane) in self.lanes.iter().enumerate() {
            if lane.id != index {
                return Err(ConfigError::LaneIdMismatch { index, id: lane.id });
            }
            match lane.kind {
                LaneKind::Corridor => match lane.speed {
                    Some(speed) if speed.is_finite() && speed != 0.0 => {}
                    _ => return Err(ConfigError::MissingSpeed(index)),
                },
                LaneKind::Traversable => {
                    if lane.speed.is_some() {
                        return Err(ConfigError::UnexpectedSpeed(index));
                    }
                }
            }
            if let Some(density) = lane.density {
                if !(0.0..=1.0).contains(&density) {
                    return Err(ConfigError::BadDensity { index, density });
                }
            }
        }

        if self.cars_per_lane == 0 {
            return Err(ConfigError::NoCars);
        }
        if self.refresh_hz.is_nan() || self.refresh_hz <= 0.0 {
            return Err(ConfigError::BadRefreshRate(self.refresh_hz));
        }
        Ok(())
    }
}
