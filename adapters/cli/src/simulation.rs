//! Scripted headless match: preparation, combat walk, result.

use anyhow::{Context, Result};
use autobattler_board::{query, Arena};
use autobattler_core::{
    Authority, BoardSnapshot, Event, FlowState, HexCoord, BOARD_WIDTH, DEPLOY_START_ROW,
};
use autobattler_system_movement::{Movement, UnitController};
use autobattler_system_spawning::{Config, UnitSpawner};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::MatchConfig;

/// Final state of one board after the round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct BoardReport {
    /// Position of the board within the arena.
    pub(crate) index: usize,
    /// Units placed during preparation.
    pub(crate) spawned: usize,
    /// Single-cell steps taken during combat.
    pub(crate) moves: usize,
    /// Steps the ledger refused during combat.
    pub(crate) rejected_moves: usize,
    /// Occupancy once the round finished.
    pub(crate) snapshot: BoardSnapshot,
}

/// Outcome of a whole scripted match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct MatchReport {
    /// Phase the arena ended in.
    pub(crate) flow_state: FlowState,
    /// Combat ticks processed per board.
    pub(crate) ticks: u32,
    /// Per-board results in arena order.
    pub(crate) boards: Vec<BoardReport>,
}

struct BoardRun {
    units: Vec<UnitController>,
    movement: Movement,
    moves: usize,
    events: Vec<Event>,
}

/// Runs one round with the provided configuration.
///
/// Every random choice is drawn from a single seeded stream, so equal
/// configurations always produce equal reports.
pub(crate) fn run_match(config: &MatchConfig) -> Result<MatchReport> {
    let authority = Authority::Writer;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut arena = Arena::new();
    let mut flow_events = Vec::new();

    let board_count = arena
        .start_flow_for_connected_players(
            authority,
            config.origins,
            config.players,
            &mut flow_events,
        )
        .context("failed to start match flow")?;

    let mut spawner = UnitSpawner::new(Config::new(1));
    let mut runs = Vec::with_capacity(board_count);
    for index in 0..board_count {
        let board = arena
            .board_mut(index)
            .with_context(|| format!("board {index} missing after flow start"))?;
        let mut units = Vec::with_capacity(config.units_per_board);
        for _ in 0..config.units_per_board {
            let free = query::free_deploy_cells(board);
            if free.is_empty() {
                debug!(board = index, "deploy zone full");
                break;
            }
            let cell = free[rng.gen_range(0..free.len())];
            let unit = spawner
                .spawn_unit(board, authority, cell, config.stats)
                .with_context(|| format!("failed to spawn unit on board {index} at {cell}"))?;
            units.push(unit);
        }
        runs.push(BoardRun {
            units,
            movement: Movement::new(),
            moves: 0,
            events: Vec::new(),
        });
    }

    arena
        .start_combat(authority, &mut flow_events)
        .context("failed to enter combat")?;

    for run in &mut runs {
        for unit in &mut run.units {
            let destination = HexCoord::new(
                rng.gen_range(0..BOARD_WIDTH),
                rng.gen_range(0..DEPLOY_START_ROW),
            );
            unit.set_destination(Some(destination));
        }
    }

    for _ in 0..config.ticks {
        for (index, run) in runs.iter_mut().enumerate() {
            let board = arena
                .board_mut(index)
                .with_context(|| format!("board {index} missing during combat"))?;
            run.moves += run
                .movement
                .advance_tick(board, authority, &mut run.units, &mut run.events);
        }
    }

    arena
        .finish_round(authority, &mut flow_events)
        .context("failed to finish round")?;

    let transitions = flow_events
        .iter()
        .filter(|event| matches!(event, Event::FlowStateChanged { .. }))
        .count();
    info!(board_count, transitions, ticks = config.ticks, "match finished");

    let boards = runs
        .iter()
        .zip(arena.boards())
        .enumerate()
        .map(|(index, (run, board))| {
            let rejected_moves = run
                .events
                .iter()
                .filter(|event| matches!(event, Event::MoveRejected { .. }))
                .count();
            debug!(
                board = index,
                events = run.events.len(),
                rejected_moves,
                "board combat log"
            );
            BoardReport {
                index,
                spawned: run.units.len(),
                moves: run.moves,
                rejected_moves,
                snapshot: query::snapshot(board),
            }
        })
        .collect();

    Ok(MatchReport {
        flow_state: arena.flow_state(),
        ticks: config.ticks,
        boards,
    })
}
