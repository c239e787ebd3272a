use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use autobattler_core::UnitStats;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Parameters of a headless match, loadable from a TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MatchConfig {
    /// Format version of the file.
    pub(crate) version: u32,
    /// Participants connected when the round starts.
    pub(crate) players: usize,
    /// Board layout origins available in the scene.
    pub(crate) origins: usize,
    /// Simulation ticks to run during combat.
    pub(crate) ticks: u32,
    /// Units spawned on every board during preparation.
    pub(crate) units_per_board: usize,
    /// Seed for deploy cell and destination selection.
    pub(crate) seed: u64,
    /// Stats every spawned unit starts with.
    pub(crate) stats: UnitStats,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            players: 2,
            origins: 8,
            ticks: 12,
            units_per_board: 4,
            seed: 0,
            stats: UnitStats::default(),
        }
    }
}

impl MatchConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read match config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid match config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse match config toml contents")?;
        if config.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported match config version {}; expected {}",
                config.version,
                SUPPORTED_CONFIG_VERSION
            );
        }

        Ok(Self {
            stats: config.stats.sanitized(),
            ..config
        })
    }
}
