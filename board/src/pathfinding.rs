//! Single-unit A* search over the free cells of one board.
//!
//! Other units are treated as static walls for the duration of a query. The
//! open set is kept in insertion order and the lowest `f = g + h` wins, with
//! ties going to whichever candidate was inserted first. Neighbors are always
//! expanded in clockwise order, so every replica holding the same ledger
//! computes the same path.

use autobattler_core::{HexCoord, PathError, BOARD_CELL_COUNT, BOARD_WIDTH};
use tracing::debug;

use crate::BoardManager;

/// Shortest free route from `start` to `goal`, both ends inclusive.
///
/// The start cell may hold the unit that is about to move; the goal must be
/// free unless it equals the start.
pub fn find_path(
    board: &BoardManager,
    start: HexCoord,
    goal: HexCoord,
) -> Result<Vec<HexCoord>, PathError> {
    for cell in [start, goal] {
        if !board.is_inside(cell) {
            return Err(PathError::OutsideBoard { cell });
        }
    }

    if start == goal {
        return Ok(vec![start]);
    }

    if board.is_occupied(goal) {
        return Err(PathError::GoalOccupied { goal });
    }

    let mut grid = SearchGrid::new();
    let mut open = vec![start];
    grid.record(start, 0, start.distance(goal), None);

    while let Some(position) = lowest_f_score(&open, &grid) {
        let current = open[position];
        if current == goal {
            return Ok(grid.reconstruct(current));
        }

        let _ = open.remove(position);
        grid.close(current);

        let Some(current_g) = grid.g_score(current) else {
            continue;
        };
        let tentative = current_g.saturating_add(1);

        for neighbor in board.neighbors(current) {
            if grid.is_closed(neighbor) || board.is_occupied(neighbor) {
                continue;
            }

            if grid
                .g_score(neighbor)
                .is_some_and(|known| tentative >= known)
            {
                continue;
            }

            let f_score = tentative.saturating_add(neighbor.distance(goal));
            grid.record(neighbor, tentative, f_score, Some(current));
            if !open.contains(&neighbor) {
                open.push(neighbor);
            }
        }
    }

    debug!(%start, %goal, "no free route");
    Err(PathError::NoPath { start, goal })
}

/// Boolean-style wrapper around [`find_path`]: `None` whenever no path exists.
#[must_use]
pub fn try_find_path(
    board: &BoardManager,
    start: HexCoord,
    goal: HexCoord,
) -> Option<Vec<HexCoord>> {
    find_path(board, start, goal).ok()
}

/// Dense per-cell search bookkeeping laid out in row-major order.
struct SearchGrid {
    g_scores: [Option<u32>; BOARD_CELL_COUNT],
    f_scores: [Option<u32>; BOARD_CELL_COUNT],
    came_from: [Option<HexCoord>; BOARD_CELL_COUNT],
    closed: [bool; BOARD_CELL_COUNT],
}

impl SearchGrid {
    fn new() -> Self {
        Self {
            g_scores: [None; BOARD_CELL_COUNT],
            f_scores: [None; BOARD_CELL_COUNT],
            came_from: [None; BOARD_CELL_COUNT],
            closed: [false; BOARD_CELL_COUNT],
        }
    }

    fn record(&mut self, cell: HexCoord, g_score: u32, f_score: u32, parent: Option<HexCoord>) {
        let Some(index) = index(cell) else {
            return;
        };
        self.g_scores[index] = Some(g_score);
        self.f_scores[index] = Some(f_score);
        self.came_from[index] = parent;
    }

    fn g_score(&self, cell: HexCoord) -> Option<u32> {
        index(cell).and_then(|index| self.g_scores[index])
    }

    fn f_score(&self, cell: HexCoord) -> u32 {
        index(cell)
            .and_then(|index| self.f_scores[index])
            .unwrap_or(u32::MAX)
    }

    fn close(&mut self, cell: HexCoord) {
        if let Some(index) = index(cell) {
            self.closed[index] = true;
        }
    }

    fn is_closed(&self, cell: HexCoord) -> bool {
        index(cell).map_or(true, |index| self.closed[index])
    }

    fn reconstruct(&self, goal: HexCoord) -> Vec<HexCoord> {
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(previous) = index(current).and_then(|index| self.came_from[index]) {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }
}

fn lowest_f_score(open: &[HexCoord], grid: &SearchGrid) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (position, cell) in open.iter().enumerate() {
        let score = grid.f_score(*cell);
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((position, score)),
        }
    }
    best.map(|(position, _)| position)
}

fn index(cell: HexCoord) -> Option<usize> {
    let column = usize::try_from(cell.q()).ok()?;
    let row = usize::try_from(cell.r()).ok()?;
    let width = usize::try_from(BOARD_WIDTH).ok()?;
    if column >= width {
        return None;
    }
    let offset = row.checked_mul(width)?.checked_add(column)?;
    (offset < BOARD_CELL_COUNT).then_some(offset)
}
