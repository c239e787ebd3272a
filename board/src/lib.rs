#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the autobattler.
//!
//! [`BoardManager`] owns the occupancy ledger of a single 7×8 hex board and is
//! the only place that ledger is ever written. Every mutation takes an
//! explicit [`Authority`]; observers may read freely but any write they
//! attempt is rejected without touching state. Reads borrow the board
//! immutably and writes borrow it mutably, so a multi-step update such as a
//! move is never visible half-applied.

use std::collections::BTreeMap;

use autobattler_core::{
    Authority, Command, Event, HexCoord, HexDirection, LedgerError, UnitId, BOARD_HEIGHT,
    BOARD_WIDTH, DEPLOY_START_ROW,
};
use tracing::{debug, trace};

mod arena;
pub mod pathfinding;
pub mod plan;

pub use arena::Arena;

/// Occupancy ledger of a single board.
#[derive(Clone, Debug, Default)]
pub struct BoardManager {
    occupants: BTreeMap<HexCoord, UnitId>,
    cells_by_unit: BTreeMap<UnitId, HexCoord>,
    revision: u64,
}

impl BoardManager {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn is_inside(&self, cell: HexCoord) -> bool {
        within_bounds(cell)
    }

    /// Reports whether the cell lies inside the player's deploy rows.
    #[must_use]
    pub fn is_deploy_zone(&self, cell: HexCoord) -> bool {
        within_bounds(cell) && cell.r() >= DEPLOY_START_ROW
    }

    /// Reports whether a unit stands on the cell.
    #[must_use]
    pub fn is_occupied(&self, cell: HexCoord) -> bool {
        self.occupants.contains_key(&cell)
    }

    /// Unit standing on the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: HexCoord) -> Option<UnitId> {
        self.occupants.get(&cell).copied()
    }

    /// Cell currently held by the unit, if it is on this board.
    #[must_use]
    pub fn cell_of(&self, unit: UnitId) -> Option<HexCoord> {
        self.cells_by_unit.get(&unit).copied()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Reports whether no unit stands on the board.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Counter bumped once per successful mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Ledger entries in ascending coordinate order.
    pub fn occupants(&self) -> impl Iterator<Item = (HexCoord, UnitId)> + '_ {
        self.occupants.iter().map(|(cell, unit)| (*cell, *unit))
    }

    /// On-board neighbors of `origin` in clockwise order, occupied or not.
    pub fn neighbors(&self, origin: HexCoord) -> impl Iterator<Item = HexCoord> {
        HexDirection::ALL
            .into_iter()
            .filter_map(move |direction| origin.neighbor(direction))
            .filter(|cell| within_bounds(*cell))
    }

    /// Places `unit` on a free deploy-zone cell.
    ///
    /// A unit may stand on at most one cell, so deploying an identifier that
    /// is already on the board is rejected as well.
    pub fn try_deploy_unit(
        &mut self,
        authority: Authority,
        unit: UnitId,
        cell: HexCoord,
    ) -> Result<(), LedgerError> {
        if let Err(reason) = self.check_deploy(authority, unit, cell) {
            debug!(%unit, %cell, %reason, "deploy rejected");
            return Err(reason);
        }

        let _ = self.occupants.insert(cell, unit);
        let _ = self.cells_by_unit.insert(unit, cell);
        self.bump_revision();
        trace!(%unit, %cell, revision = self.revision, "unit deployed");
        Ok(())
    }

    /// Moves the unit standing on `from` onto the free cell `to`.
    ///
    /// Returns the unit that moved. Adjacency is not required; callers that
    /// want single steps take them from a path.
    pub fn try_move_unit(
        &mut self,
        authority: Authority,
        from: HexCoord,
        to: HexCoord,
    ) -> Result<UnitId, LedgerError> {
        let unit = match self.check_move(authority, from, to) {
            Ok(unit) => unit,
            Err(reason) => {
                debug!(%from, %to, %reason, "move rejected");
                return Err(reason);
            }
        };

        let _ = self.occupants.remove(&from);
        let _ = self.occupants.insert(to, unit);
        let _ = self.cells_by_unit.insert(unit, to);
        self.bump_revision();
        trace!(%unit, %from, %to, revision = self.revision, "unit moved");
        Ok(unit)
    }

    /// Clears the cell and returns the unit that stood on it.
    pub fn remove_unit(
        &mut self,
        authority: Authority,
        cell: HexCoord,
    ) -> Result<UnitId, LedgerError> {
        if !authority.can_write() {
            debug!(%cell, "removal rejected without authority");
            return Err(LedgerError::NotAuthorized);
        }

        let Some(unit) = self.occupants.remove(&cell) else {
            return Err(LedgerError::NotFound { cell });
        };
        let _ = self.cells_by_unit.remove(&unit);
        self.bump_revision();
        trace!(%unit, %cell, revision = self.revision, "unit removed");
        Ok(unit)
    }

    /// Empties the ledger, returning how many units were removed.
    pub fn clear(&mut self, authority: Authority) -> Result<usize, LedgerError> {
        if !authority.can_write() {
            return Err(LedgerError::NotAuthorized);
        }

        let removed = self.occupants.len();
        if removed > 0 {
            self.occupants.clear();
            self.cells_by_unit.clear();
            self.bump_revision();
        }
        Ok(removed)
    }

    fn check_deploy(
        &self,
        authority: Authority,
        unit: UnitId,
        cell: HexCoord,
    ) -> Result<(), LedgerError> {
        if !authority.can_write() {
            return Err(LedgerError::NotAuthorized);
        }
        if !unit.is_valid() {
            return Err(LedgerError::InvalidIdentifier);
        }
        if !self.is_deploy_zone(cell) {
            return Err(LedgerError::InvalidTarget { cell });
        }
        if let Some(occupant) = self.occupant(cell) {
            return Err(LedgerError::Occupied { cell, occupant });
        }
        if let Some(existing) = self.cell_of(unit) {
            return Err(LedgerError::DuplicateUnit {
                unit,
                cell: existing,
            });
        }
        Ok(())
    }

    fn check_move(
        &self,
        authority: Authority,
        from: HexCoord,
        to: HexCoord,
    ) -> Result<UnitId, LedgerError> {
        if !authority.can_write() {
            return Err(LedgerError::NotAuthorized);
        }
        if !self.is_inside(to) {
            return Err(LedgerError::InvalidTarget { cell: to });
        }
        if let Some(occupant) = self.occupant(to) {
            return Err(LedgerError::Occupied { cell: to, occupant });
        }
        self.occupant(from).ok_or(LedgerError::NotFound { cell: from })
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Applies the provided command to the board, reporting the outcome as events.
pub fn apply(
    board: &mut BoardManager,
    authority: Authority,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::DeployUnit { unit, cell } => {
            let event = match board.try_deploy_unit(authority, unit, cell) {
                Ok(()) => Event::UnitDeployed { unit, cell },
                Err(reason) => Event::DeployRejected { unit, cell, reason },
            };
            out_events.push(event);
        }
        Command::MoveUnit { from, to } => {
            let event = match board.try_move_unit(authority, from, to) {
                Ok(unit) => Event::UnitMoved { unit, from, to },
                Err(reason) => Event::MoveRejected { from, to, reason },
            };
            out_events.push(event);
        }
        Command::RemoveUnit { cell } => {
            let event = match board.remove_unit(authority, cell) {
                Ok(unit) => Event::UnitRemoved { unit, cell },
                Err(reason) => Event::RemovalRejected { cell, reason },
            };
            out_events.push(event);
        }
    }
}

/// Query functions that provide read-only access to board state.
pub mod query {
    use autobattler_core::{BoardSnapshot, HexCoord, OccupantRecord};

    use super::{plan, BoardManager};

    /// Captures a versioned copy of the ledger for replication.
    #[must_use]
    pub fn snapshot(board: &BoardManager) -> BoardSnapshot {
        let records = board
            .occupants()
            .map(|(cell, unit)| OccupantRecord { cell, unit })
            .collect();
        BoardSnapshot::from_occupants(board.revision(), records)
    }

    /// Unoccupied cells in row-major order.
    #[must_use]
    pub fn free_cells(board: &BoardManager) -> Vec<HexCoord> {
        plan::enumerate_board_coords()
            .filter(|cell| !board.is_occupied(*cell))
            .collect()
    }

    /// Unoccupied deploy-zone cells in row-major order.
    #[must_use]
    pub fn free_deploy_cells(board: &BoardManager) -> Vec<HexCoord> {
        plan::enumerate_board_coords()
            .filter(|cell| board.is_deploy_zone(*cell) && !board.is_occupied(*cell))
            .collect()
    }
}

const fn within_bounds(cell: HexCoord) -> bool {
    cell.q() >= 0 && cell.q() < BOARD_WIDTH && cell.r() >= 0 && cell.r() < BOARD_HEIGHT
}
