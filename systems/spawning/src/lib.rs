#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that hands out unit identifiers and places new units.

use autobattler_board::BoardManager;
use autobattler_core::{Authority, HexCoord, LedgerError, UnitId, UnitStats};
use autobattler_system_movement::UnitController;
use tracing::{debug, info};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    first_unit_id: u64,
}

impl Config {
    /// Creates a configuration whose first allocated identifier is `first_unit_id`.
    ///
    /// Zero is reserved for "no unit" and is bumped to one.
    #[must_use]
    pub const fn new(first_unit_id: u64) -> Self {
        Self {
            first_unit_id: if first_unit_id == 0 { 1 } else { first_unit_id },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Allocates identifiers and deploys freshly created units.
#[derive(Debug)]
pub struct UnitSpawner {
    next_id: u64,
}

impl UnitSpawner {
    /// Creates a spawner using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            next_id: config.first_unit_id,
        }
    }

    /// Identifier the next successful or failed spawn will consume.
    #[must_use]
    pub const fn peek_next_id(&self) -> UnitId {
        UnitId::new(self.next_id)
    }

    /// Creates a unit with `stats` and deploys it onto `cell`.
    ///
    /// A placement failure discards the allocated identifier; it is never
    /// reused. Observers are rejected before any identifier is consumed.
    pub fn spawn_unit(
        &mut self,
        board: &mut BoardManager,
        authority: Authority,
        cell: HexCoord,
        stats: UnitStats,
    ) -> Result<UnitController, LedgerError> {
        if !authority.can_write() {
            return Err(LedgerError::NotAuthorized);
        }

        let id = self.allocate();
        let mut unit = UnitController::new(id, stats);
        match unit.initialize_at(board, authority, cell) {
            Ok(()) => {
                info!(unit = %id, %cell, "unit spawned");
                Ok(unit)
            }
            Err(error) => {
                debug!(unit = %id, %cell, %error, "spawn failed, unit despawned");
                Err(error)
            }
        }
    }

    fn allocate(&mut self) -> UnitId {
        let id = UnitId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }
}

impl Default for UnitSpawner {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
