#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the autobattler board engine.
//!
//! This crate defines the message surface that connects the authoritative
//! board, the movement and spawning systems, and whatever replication layer
//! sits on top. Callers submit [`Command`] values describing desired ledger
//! mutations together with an explicit [`Authority`], the board executes them
//! via its `apply` entry point, and then reports [`Event`] values describing
//! what actually happened. Nothing in here carries engine or transport state;
//! every type is a plain value that serializes losslessly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of hex columns on a single board.
pub const BOARD_WIDTH: i32 = 7;

/// Number of hex rows on a single board.
pub const BOARD_HEIGHT: i32 = 8;

/// First row (inclusive) of the deploy zone. Rows below it belong to the opponent side.
pub const DEPLOY_START_ROW: i32 = 4;

/// Upper bound on boards that may exist simultaneously, one per participant.
pub const MAX_BOARD_COUNT: usize = 8;

/// Upper bound on participants that are counted when boards are laid out.
pub const MAX_PLAYER_COUNT: usize = 8;

/// Total number of cells on a single board.
pub const BOARD_CELL_COUNT: usize = (BOARD_WIDTH * BOARD_HEIGHT) as usize;

/// Write capability for a board, supplied by the caller on every mutation.
///
/// The surrounding replication layer decides who holds it. The core only
/// queries it and never stores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    /// Caller is the single authoritative writer for the board.
    Writer,
    /// Caller merely observes replicated state and may not mutate it.
    Observer,
}

impl Authority {
    /// Converts a raw "has state authority" flag into a capability.
    #[must_use]
    pub const fn from_flag(has_authority: bool) -> Self {
        if has_authority {
            Self::Writer
        } else {
            Self::Observer
        }
    }

    /// Reports whether the capability permits mutating board state.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Writer)
    }
}

/// Opaque identifier assigned to a unit. Zero is reserved as invalid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u64);

impl UnitId {
    /// Reserved identifier that never names a live unit.
    pub const INVALID: Self = Self(0);

    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Reports whether the identifier may name a unit.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the six directions leading out of a hex, in clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HexDirection {
    /// Offset `(+1, 0)`.
    East,
    /// Offset `(+1, -1)`.
    NorthEast,
    /// Offset `(0, -1)`.
    NorthWest,
    /// Offset `(-1, 0)`.
    West,
    /// Offset `(-1, +1)`.
    SouthWest,
    /// Offset `(0, +1)`.
    SouthEast,
}

impl HexDirection {
    /// Every direction in the fixed clockwise order used for neighbor expansion.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];

    /// Axial `(q, r)` offset travelled when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::East => (1, 0),
            Self::NorthEast => (1, -1),
            Self::NorthWest => (0, -1),
            Self::West => (-1, 0),
            Self::SouthWest => (-1, 1),
            Self::SouthEast => (0, 1),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::East => Self::West,
            Self::NorthEast => Self::SouthWest,
            Self::NorthWest => Self::SouthEast,
            Self::West => Self::East,
            Self::SouthWest => Self::NorthEast,
            Self::SouthEast => Self::NorthWest,
        }
    }
}

/// Axial hex coordinate. `q` runs along a row, `r` selects the row.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoord {
    q: i32,
    r: i32,
}

impl HexCoord {
    /// Creates a new axial coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Column-like axial component.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// Row axial component.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }

    /// Implicit third cube component, `-q - r`, widened so it never overflows.
    #[must_use]
    pub const fn s(&self) -> i64 {
        -(self.q as i64) - self.r as i64
    }

    /// Adjacent coordinate in the provided direction. Not bounds checked.
    ///
    /// `None` when the step leaves the `i32` coordinate range.
    #[must_use]
    pub const fn neighbor(self, direction: HexDirection) -> Option<Self> {
        let (dq, dr) = direction.offset();
        match (self.q.checked_add(dq), self.r.checked_add(dr)) {
            (Some(q), Some(r)) => Some(Self::new(q, r)),
            _ => None,
        }
    }

    /// Adjacent coordinates in clockwise order, skipping any that overflow.
    pub fn neighbors(self) -> impl Iterator<Item = HexCoord> {
        HexDirection::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbor(direction))
    }

    /// Number of single hex steps separating two coordinates.
    ///
    /// Computed in cube space: `(|dq| + |dr| + |ds|) / 2`. Saturates at
    /// `u32::MAX` for coordinates far outside any real board.
    #[must_use]
    pub fn distance(self, other: HexCoord) -> u32 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        let ds = -dq - dr;
        let steps = (dq.abs() + dr.abs() + ds.abs()) / 2;
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// Direction leading from `self` to an adjacent `other`, if they touch.
    #[must_use]
    pub fn direction_to(self, other: HexCoord) -> Option<HexDirection> {
        HexDirection::ALL
            .into_iter()
            .find(|direction| self.neighbor(*direction) == Some(other))
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Commands that express all permissible ledger mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Places a unit onto a free deploy-zone cell.
    DeployUnit {
        /// Unit being placed.
        unit: UnitId,
        /// Destination cell inside the deploy zone.
        cell: HexCoord,
    },
    /// Moves whichever unit stands on `from` to the free cell `to`.
    MoveUnit {
        /// Cell currently holding the unit.
        from: HexCoord,
        /// Free destination cell.
        to: HexCoord,
    },
    /// Clears the provided cell.
    RemoveUnit {
        /// Cell whose occupant should be removed.
        cell: HexCoord,
    },
}

/// Events reported by the board after processing commands or ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation advanced one discrete step.
    TickAdvanced {
        /// Index of the tick that was just processed, starting at one.
        tick: u64,
    },
    /// Confirms that a unit was placed on the board.
    UnitDeployed {
        /// Unit that was placed.
        unit: UnitId,
        /// Cell the unit now occupies.
        cell: HexCoord,
    },
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: HexCoord,
        /// Cell the unit occupies after moving.
        to: HexCoord,
    },
    /// Confirms that a unit was removed from the board.
    UnitRemoved {
        /// Unit that was removed.
        unit: UnitId,
        /// Cell the unit occupied before removal.
        cell: HexCoord,
    },
    /// Reports that a deploy request was rejected.
    DeployRejected {
        /// Unit named in the request.
        unit: UnitId,
        /// Cell named in the request.
        cell: HexCoord,
        /// Specific reason the request failed.
        reason: LedgerError,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Source cell named in the request.
        from: HexCoord,
        /// Destination cell named in the request.
        to: HexCoord,
        /// Specific reason the request failed.
        reason: LedgerError,
    },
    /// Reports that a removal request was rejected.
    RemovalRejected {
        /// Cell named in the request.
        cell: HexCoord,
        /// Specific reason the request failed.
        reason: LedgerError,
    },
    /// Announces that the match entered a new round phase.
    FlowStateChanged {
        /// Phase that became active.
        state: FlowState,
    },
}

/// Reasons a ledger mutation may be rejected by the board.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum LedgerError {
    /// Caller does not hold the board's write authority.
    #[error("caller does not hold write authority for the board")]
    NotAuthorized,
    /// The reserved identifier was supplied for a deploy.
    #[error("unit identifier is reserved")]
    InvalidIdentifier,
    /// Cell lies outside the board, or outside the deploy zone for a deploy.
    #[error("cell {cell} is not a legal target")]
    InvalidTarget {
        /// Offending cell.
        cell: HexCoord,
    },
    /// Destination already holds a unit.
    #[error("cell {cell} is already occupied by unit {occupant}")]
    Occupied {
        /// Offending cell.
        cell: HexCoord,
        /// Unit standing on the cell.
        occupant: UnitId,
    },
    /// Source cell holds no unit.
    #[error("no unit stands on cell {cell}")]
    NotFound {
        /// Empty cell named by the request.
        cell: HexCoord,
    },
    /// Unit already occupies a different cell on this board.
    #[error("unit {unit} already occupies cell {cell}")]
    DuplicateUnit {
        /// Unit named by the request.
        unit: UnitId,
        /// Cell the unit currently occupies.
        cell: HexCoord,
    },
}

/// Reasons a path query may come back empty.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PathError {
    /// Start or goal lies outside the board.
    #[error("cell {cell} lies outside the board")]
    OutsideBoard {
        /// Offending endpoint.
        cell: HexCoord,
    },
    /// Goal differs from the start and already holds a unit.
    #[error("goal {goal} is occupied")]
    GoalOccupied {
        /// Occupied goal cell.
        goal: HexCoord,
    },
    /// Every free route between the endpoints is blocked.
    #[error("no free route from {start} to {goal}")]
    NoPath {
        /// Start of the query.
        start: HexCoord,
        /// Goal of the query.
        goal: HexCoord,
    },
}

/// Reasons a round-flow transition may be rejected.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum FlowError {
    /// Caller does not hold the match's write authority.
    #[error("caller does not hold write authority for the match")]
    NotAuthorized,
}

/// Phase of a single autobattler round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    /// Boards have not been generated yet.
    #[default]
    Idle,
    /// Players place units inside their deploy zones.
    Preparation,
    /// Units move and fight without player input.
    Combat,
    /// Round finished; results are being presented.
    Result,
}

/// Static combat and behaviour parameters of a unit archetype.
///
/// Only carried on the unit's lifecycle record. Combat resolution lives
/// outside this workspace.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Damage dealt per attack.
    pub attack_power: i32,
    /// Health a unit spawns with.
    pub max_hp: i32,
    /// Mana required to cast.
    pub max_mana: i32,
    /// Flat damage reduction.
    pub defense: i32,
    /// Attack reach measured in hex steps.
    pub attack_range: i32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Cells travelled per tick. Carried like the combat stats; movement
    /// always takes a single step per tick.
    pub move_speed_per_tick: i32,
}

impl UnitStats {
    /// Returns a copy with every field clamped to its legal minimum.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            attack_power: self.attack_power.max(1),
            max_hp: self.max_hp.max(1),
            max_mana: self.max_mana.max(0),
            defense: self.defense.max(0),
            attack_range: self.attack_range.max(1),
            attack_speed: if self.attack_speed.is_finite() {
                self.attack_speed.max(0.1)
            } else {
                0.1
            },
            move_speed_per_tick: self.move_speed_per_tick.max(1),
        }
    }
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            attack_power: 10,
            max_hp: 100,
            max_mana: 100,
            defense: 0,
            attack_range: 1,
            attack_speed: 1.0,
            move_speed_per_tick: 1,
        }
    }
}

/// Single ledger entry captured inside a [`BoardSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupantRecord {
    /// Occupied cell.
    pub cell: HexCoord,
    /// Unit standing on the cell.
    pub unit: UnitId,
}

/// Versioned, serializable copy of a board's occupancy ledger.
///
/// Produced after each tick for the replication layer. Records are ordered
/// by coordinate so that equal ledgers always encode to equal bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot {
    revision: u64,
    occupants: Vec<OccupantRecord>,
}

impl BoardSnapshot {
    /// Creates a snapshot from ledger entries in any order.
    #[must_use]
    pub fn from_occupants(revision: u64, mut occupants: Vec<OccupantRecord>) -> Self {
        occupants.sort_by_key(|record| record.cell);
        Self {
            revision,
            occupants,
        }
    }

    /// Ledger revision the snapshot was taken at.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Ledger entries ordered by coordinate.
    #[must_use]
    pub fn occupants(&self) -> &[OccupantRecord] {
        &self.occupants
    }

    /// Unit standing on the provided cell at the time of the snapshot.
    #[must_use]
    pub fn occupant(&self, cell: HexCoord) -> Option<UnitId> {
        self.occupants
            .binary_search_by_key(&cell, |record| record.cell)
            .ok()
            .map(|index| self.occupants[index].unit)
    }
}
