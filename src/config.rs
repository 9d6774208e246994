//! Configuration for SkipKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::Result;
use crate::skiplist::LevelGenerator;
use crate::snapshot::SnapshotFormat;

/// Highest `max_level` accepted by [`Config::validate`]
pub const MAX_LEVEL_LIMIT: usize = 64;

/// Default level cap for new skip lists
pub const DEFAULT_MAX_LEVEL: usize = 32;

/// Default promotion probability for new skip lists
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Main configuration for a SkipKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Snapshot Configuration
    // -------------------------------------------------------------------------
    /// Snapshot file loaded on open and written on dump
    pub snapshot_path: PathBuf,

    /// Encoding used when dumping (loading auto-detects)
    pub snapshot_format: SnapshotFormat,

    /// Dump to `snapshot_path` when the store is dropped
    pub dump_on_drop: bool,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Highest level a node may be assigned
    pub max_level: usize,

    /// Probability that a node is promoted one more level
    pub probability: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("./store/dumpFile"),
            snapshot_format: SnapshotFormat::Text,
            dump_on_drop: true,
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the level parameters
    ///
    /// `max_level` must not exceed [`MAX_LEVEL_LIMIT`] and `probability`
    /// must lie in `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        LevelGenerator::new(self.max_level, self.probability)?;
        Ok(())
    }

    /// Level generator described by this config
    pub fn level_generator(&self) -> Result<LevelGenerator> {
        LevelGenerator::new(self.max_level, self.probability)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Set the snapshot encoding used by dump
    pub fn snapshot_format(mut self, format: SnapshotFormat) -> Self {
        self.config.snapshot_format = format;
        self
    }

    /// Enable or disable the dump performed on drop
    pub fn dump_on_drop(mut self, enabled: bool) -> Self {
        self.config.dump_on_drop = enabled;
        self
    }

    /// Set the highest level a node may be assigned
    pub fn max_level(mut self, level: usize) -> Self {
        self.config.max_level = level;
        self
    }

    /// Set the per-level promotion probability
    pub fn probability(mut self, p: f64) -> Self {
        self.config.probability = p;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
