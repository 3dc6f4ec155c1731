//! Run settings read from an optional TOML file and overridden by flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use survivor_core::WorldMode;
use survivor_simulation::SimulationConfig;

/// Seconds each level lasts before the difficulty steps up.
pub(crate) const LEVEL_DURATION: f32 = 120.0;

/// Settings for a headless run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunConfig {
    /// Simulation seed and capacities.
    pub(crate) simulation: SimulationConfig,
    /// Number of frames to simulate.
    pub(crate) frames: u32,
    /// Seconds per frame.
    pub(crate) dt: f32,
    /// Starting level; each level speeds the enemies up by a fifth.
    pub(crate) level: u32,
    /// Whether the map wraps around.
    pub(crate) infinite: bool,
    /// Tile map file; an all-grass field when absent.
    pub(crate) map: Option<PathBuf>,
    /// Where saves are written and resumed from.
    pub(crate) save_path: PathBuf,
    /// Save every this many frames.
    pub(crate) save_every: Option<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            frames: 3_600,
            dt: 1.0 / 60.0,
            level: 1,
            infinite: false,
            map: None,
            save_path: PathBuf::from("savegame.txt"),
            save_every: None,
        }
    }
}

impl RunConfig {
    /// Reads settings from a TOML file.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read run config at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid run config at {}", path.display()))
    }

    /// Parses settings from TOML text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse run config toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the driver cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(self.dt > 0.0 && self.dt.is_finite(), "dt must be positive, got {}", self.dt);
        ensure!(self.level >= 1, "levels start at 1");
        ensure!(self.save_every != Some(0), "save_every must be at least 1");
        Ok(())
    }

    /// World mode selected by the `infinite` flag.
    pub(crate) const fn mode(&self) -> WorldMode {
        WorldMode::from_infinite_flag(self.infinite)
    }
}

/// Time scale applied to the simulation at `level`.
pub(crate) fn difficulty_multiplier(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * 0.2
}
