#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks units one hex per tick.
//!
//! Every tick each unit asks the pathfinder for a fresh route from its current
//! cell toward its destination and, if one exists, takes only the first step
//! through the board's ledger. Routes are never cached: the next tick starts
//! over from whatever the ledger looks like then.

use autobattler_board::{self as board, pathfinding, BoardManager};
use autobattler_core::{
    Authority, Command, Event, HexCoord, LedgerError, PathError, UnitId, UnitStats,
};
use tracing::trace;

/// Combat attributes carried on a unit's lifecycle record.
///
/// Initialized at spawn and otherwise untouched by this workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatState {
    hp: i32,
    mana: i32,
    target: Option<UnitId>,
    attack_cooldown: Option<u64>,
}

impl CombatState {
    /// Fresh combat state for a unit spawned with the provided stats.
    #[must_use]
    pub const fn spawned_with(stats: &UnitStats) -> Self {
        Self {
            hp: stats.max_hp,
            mana: 0,
            target: None,
            attack_cooldown: None,
        }
    }

    /// Remaining health.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    /// Accumulated mana.
    #[must_use]
    pub const fn mana(&self) -> i32 {
        self.mana
    }

    /// Unit currently being attacked, if any.
    #[must_use]
    pub const fn target(&self) -> Option<UnitId> {
        self.target
    }

    /// Tick at which the next attack becomes available, if cooling down.
    #[must_use]
    pub const fn attack_cooldown(&self) -> Option<u64> {
        self.attack_cooldown
    }

    fn reset_engagement(&mut self) {
        self.target = None;
        self.attack_cooldown = None;
    }
}

/// Why a unit did not move on a given tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleReason {
    /// Caller does not hold the board's write authority.
    NotAuthorized,
    /// Unit has not been placed on a board yet.
    NotPlaced,
    /// Ledger no longer shows the unit on its recorded cell.
    NotOnBoard,
    /// Unit has no destination.
    NoTarget,
    /// Unit already stands on its destination.
    AtTarget,
    /// Pathfinder found no usable route.
    NoPath(PathError),
    /// Ledger refused the step.
    Blocked(LedgerError),
}

/// Result of a single movement decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Unit advanced one cell.
    Moved {
        /// Cell occupied before the step.
        from: HexCoord,
        /// Cell occupied after the step.
        to: HexCoord,
    },
    /// Unit stayed in place.
    Idle(IdleReason),
}

impl StepOutcome {
    /// Reports whether the unit changed cells.
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Movement record of a single unit.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitController {
    id: UnitId,
    stats: UnitStats,
    cell: Option<HexCoord>,
    destination: Option<HexCoord>,
    combat: CombatState,
}

impl UnitController {
    /// Creates a controller for a unit that is not yet on any board.
    #[must_use]
    pub fn new(id: UnitId, stats: UnitStats) -> Self {
        let stats = stats.sanitized();
        Self {
            id,
            stats,
            cell: None,
            destination: None,
            combat: CombatState::spawned_with(&stats),
        }
    }

    /// Identifier of the unit.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Static parameters the unit was created with.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Cell the unit currently occupies, once placed.
    #[must_use]
    pub const fn cell(&self) -> Option<HexCoord> {
        self.cell
    }

    /// Cell the unit is walking toward.
    #[must_use]
    pub const fn destination(&self) -> Option<HexCoord> {
        self.destination
    }

    /// Combat attributes of the unit.
    #[must_use]
    pub const fn combat(&self) -> &CombatState {
        &self.combat
    }

    /// Sets or clears the cell the unit walks toward on subsequent ticks.
    pub fn set_destination(&mut self, destination: Option<HexCoord>) {
        self.destination = destination;
    }

    /// Deploys the unit onto `cell` and resets its engagement state.
    pub fn initialize_at(
        &mut self,
        board: &mut BoardManager,
        authority: Authority,
        cell: HexCoord,
    ) -> Result<(), LedgerError> {
        board.try_deploy_unit(authority, self.id, cell)?;
        self.cell = Some(cell);
        self.combat.reset_engagement();
        Ok(())
    }

    /// Per-tick entry point: one step toward the current destination.
    pub fn advance_tick(&mut self, board: &mut BoardManager, authority: Authority) -> StepOutcome {
        match self.destination {
            Some(destination) => self.try_move_one_step(board, authority, destination),
            None => StepOutcome::Idle(IdleReason::NoTarget),
        }
    }

    /// Recomputes a path to `target` and takes at most its first step.
    pub fn try_move_one_step(
        &mut self,
        board: &mut BoardManager,
        authority: Authority,
        target: HexCoord,
    ) -> StepOutcome {
        let (from, to) = match self.plan_step(board, authority, target) {
            Ok(step) => step,
            Err(reason) => return StepOutcome::Idle(reason),
        };

        if let Err(error) = board.try_move_unit(authority, from, to) {
            return StepOutcome::Idle(IdleReason::Blocked(error));
        }

        self.record_step(from, to);
        StepOutcome::Moved { from, to }
    }

    /// Decides the single step toward `target` without touching the board.
    ///
    /// Returns the `(from, to)` pair to hand to the ledger.
    pub fn plan_step(
        &self,
        board: &BoardManager,
        authority: Authority,
        target: HexCoord,
    ) -> Result<(HexCoord, HexCoord), IdleReason> {
        if !authority.can_write() {
            return Err(IdleReason::NotAuthorized);
        }

        let current = self.cell.ok_or(IdleReason::NotPlaced)?;
        if board.occupant(current) != Some(self.id) {
            return Err(IdleReason::NotOnBoard);
        }

        let path = pathfinding::find_path(board, current, target).map_err(IdleReason::NoPath)?;
        match path.get(1) {
            Some(&next) => Ok((current, next)),
            None => Err(IdleReason::AtTarget),
        }
    }

    fn record_step(&mut self, from: HexCoord, to: HexCoord) {
        self.cell = Some(to);
        trace!(unit = %self.id, %from, %to, "unit stepped");
    }
}

/// Advances every unit on a board exactly once per tick.
#[derive(Debug, Default)]
pub struct Movement {
    tick: u64,
}

impl Movement {
    /// Creates a movement system that has not processed any tick yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Runs one simulation step for the provided units.
    ///
    /// Units act in ascending identifier order regardless of slice order. Each
    /// planned step goes through [`board::apply`], so the ledger's
    /// `UnitMoved`/`MoveRejected` events land in `out_events`. Observers do
    /// nothing. Returns how many units moved.
    pub fn advance_tick(
        &mut self,
        board: &mut BoardManager,
        authority: Authority,
        units: &mut [UnitController],
        out_events: &mut Vec<Event>,
    ) -> usize {
        if !authority.can_write() {
            return 0;
        }

        self.tick = self.tick.saturating_add(1);
        out_events.push(Event::TickAdvanced { tick: self.tick });

        let mut order: Vec<usize> = (0..units.len()).collect();
        order.sort_by_key(|&index| units[index].id());

        let mut moved = 0;
        for index in order {
            let unit = &mut units[index];
            let Some(destination) = unit.destination() else {
                continue;
            };
            let Ok((from, to)) = unit.plan_step(board, authority, destination) else {
                continue;
            };

            board::apply(board, authority, Command::MoveUnit { from, to }, out_events);
            if let Some(Event::UnitMoved { unit: mover, .. }) = out_events.last() {
                if *mover == unit.id() {
                    unit.record_step(from, to);
                    moved += 1;
                }
            }
        }

        trace!(tick = self.tick, moved, "movement tick processed");
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: u64, cell: HexCoord, board: &mut BoardManager) -> UnitController {
        let mut unit = UnitController::new(UnitId::new(id), UnitStats::default());
        unit.initialize_at(board, Authority::Writer, cell)
            .expect("deploy zone cell");
        unit
    }

    #[test]
    fn spawned_combat_state_is_inert() {
        let stats = UnitStats {
            max_hp: 250,
            ..UnitStats::default()
        };
        let unit = UnitController::new(UnitId::new(1), stats);

        assert_eq!(unit.combat().hp(), 250);
        assert_eq!(unit.combat().mana(), 0);
        assert_eq!(unit.combat().target(), None);
        assert_eq!(unit.combat().attack_cooldown(), None);
        assert_eq!(unit.cell(), None);
    }

    #[test]
    fn initialize_records_cell_on_success_only() {
        let mut board = BoardManager::new();
        let mut unit = UnitController::new(UnitId::new(3), UnitStats::default());

        assert_eq!(
            unit.initialize_at(&mut board, Authority::Writer, HexCoord::new(2, 2)),
            Err(LedgerError::InvalidTarget {
                cell: HexCoord::new(2, 2)
            })
        );
        assert_eq!(unit.cell(), None);

        assert_eq!(
            unit.initialize_at(&mut board, Authority::Writer, HexCoord::new(2, 6)),
            Ok(())
        );
        assert_eq!(unit.cell(), Some(HexCoord::new(2, 6)));
    }

    #[test]
    fn step_follows_first_path_cell() {
        let mut board = BoardManager::new();
        let mut unit = placed(1, HexCoord::new(0, 6), &mut board);

        let outcome = unit.try_move_one_step(&mut board, Authority::Writer, HexCoord::new(0, 4));

        assert_eq!(
            outcome,
            StepOutcome::Moved {
                from: HexCoord::new(0, 6),
                to: HexCoord::new(0, 5)
            }
        );
        assert_eq!(unit.cell(), Some(HexCoord::new(0, 5)));
        assert_eq!(board.occupant(HexCoord::new(0, 5)), Some(UnitId::new(1)));
    }

    #[test]
    fn idle_reasons_cover_non_moves() {
        let mut board = BoardManager::new();
        let mut unit = placed(1, HexCoord::new(3, 5), &mut board);
        let _ = placed(2, HexCoord::new(3, 4), &mut board);

        assert_eq!(
            unit.try_move_one_step(&mut board, Authority::Observer, HexCoord::new(3, 0)),
            StepOutcome::Idle(IdleReason::NotAuthorized)
        );
        assert_eq!(
            unit.advance_tick(&mut board, Authority::Writer),
            StepOutcome::Idle(IdleReason::NoTarget)
        );
        assert_eq!(
            unit.try_move_one_step(&mut board, Authority::Writer, HexCoord::new(3, 5)),
            StepOutcome::Idle(IdleReason::AtTarget)
        );
        assert_eq!(
            unit.try_move_one_step(&mut board, Authority::Writer, HexCoord::new(3, 4)),
            StepOutcome::Idle(IdleReason::NoPath(PathError::GoalOccupied {
                goal: HexCoord::new(3, 4)
            }))
        );
        assert_eq!(unit.cell(), Some(HexCoord::new(3, 5)));
    }

    #[test]
    fn unplaced_and_removed_units_do_not_move() {
        let mut board = BoardManager::new();
        let mut stranger = UnitController::new(UnitId::new(8), UnitStats::default());
        assert_eq!(
            stranger.try_move_one_step(&mut board, Authority::Writer, HexCoord::new(0, 0)),
            StepOutcome::Idle(IdleReason::NotPlaced)
        );

        let mut unit = placed(1, HexCoord::new(4, 7), &mut board);
        let _ = board
            .remove_unit(Authority::Writer, HexCoord::new(4, 7))
            .expect("remove");
        let _ = placed(2, HexCoord::new(4, 7), &mut board);

        assert_eq!(
            unit.try_move_one_step(&mut board, Authority::Writer, HexCoord::new(4, 0)),
            StepOutcome::Idle(IdleReason::NotOnBoard)
        );
        assert_eq!(board.occupant(HexCoord::new(4, 7)), Some(UnitId::new(2)));
    }

    #[test]
    fn movement_orders_units_by_identifier() {
        let mut board = BoardManager::new();
        let mut late = placed(2, HexCoord::new(1, 6), &mut board);
        let mut early = placed(1, HexCoord::new(0, 6), &mut board);
        late.set_destination(Some(HexCoord::new(1, 5)));
        early.set_destination(Some(HexCoord::new(1, 5)));
        let mut units = vec![late, early];
        let mut events = Vec::new();
        let mut movement = Movement::new();

        let moved = movement.advance_tick(&mut board, Authority::Writer, &mut units, &mut events);

        assert_eq!(moved, 1);
        assert_eq!(
            events,
            vec![
                Event::TickAdvanced { tick: 1 },
                Event::UnitMoved {
                    unit: UnitId::new(1),
                    from: HexCoord::new(0, 6),
                    to: HexCoord::new(1, 5)
                },
            ]
        );
        assert_eq!(units[0].cell(), Some(HexCoord::new(1, 6)));
    }

    #[test]
    fn planning_leaves_ledger_untouched() {
        let mut board = BoardManager::new();
        let unit = placed(1, HexCoord::new(0, 6), &mut board);
        let revision = board.revision();

        assert_eq!(
            unit.plan_step(&board, Authority::Writer, HexCoord::new(0, 4)),
            Ok((HexCoord::new(0, 6), HexCoord::new(0, 5)))
        );
        assert_eq!(board.revision(), revision);
        assert_eq!(unit.cell(), Some(HexCoord::new(0, 6)));
    }

    #[test]
    fn movement_steps_go_through_ledger_commands() {
        let mut board = BoardManager::new();
        let mut walker = placed(1, HexCoord::new(2, 7), &mut board);
        let mut stale = placed(2, HexCoord::new(5, 7), &mut board);
        walker.set_destination(Some(HexCoord::new(2, 0)));
        stale.set_destination(Some(HexCoord::new(5, 0)));
        let _ = board
            .remove_unit(Authority::Writer, HexCoord::new(5, 7))
            .expect("remove");
        let revision = board.revision();
        let mut units = vec![walker, stale];
        let mut events = Vec::new();
        let mut movement = Movement::new();

        let moved = movement.advance_tick(&mut board, Authority::Writer, &mut units, &mut events);

        let mut ledger_events = Vec::new();
        let mut replica = BoardManager::new();
        board::apply(
            &mut replica,
            Authority::Writer,
            Command::DeployUnit {
                unit: UnitId::new(1),
                cell: HexCoord::new(2, 7),
            },
            &mut ledger_events,
        );
        board::apply(
            &mut replica,
            Authority::Writer,
            Command::MoveUnit {
                from: HexCoord::new(2, 7),
                to: HexCoord::new(2, 6),
            },
            &mut ledger_events,
        );

        assert_eq!(moved, 1);
        assert_eq!(board.revision(), revision + 1);
        assert_eq!(events[1..], ledger_events[1..]);
        assert_eq!(events.len(), 2);
        assert_eq!(units[1].cell(), Some(HexCoord::new(5, 7)));
    }

    #[test]
    fn observers_do_not_advance_ticks() {
        let mut board = BoardManager::new();
        let mut unit = placed(1, HexCoord::new(0, 6), &mut board);
        unit.set_destination(Some(HexCoord::new(0, 0)));
        let mut units = vec![unit];
        let mut events = Vec::new();
        let mut movement = Movement::new();

        let moved =
            movement.advance_tick(&mut board, Authority::Observer, &mut units, &mut events);

        assert_eq!(moved, 0);
        assert_eq!(movement.tick(), 0);
        assert!(events.is_empty());
        assert_eq!(board.occupant(HexCoord::new(0, 6)), Some(UnitId::new(1)));
    }
}
