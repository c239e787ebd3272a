//! Board sizing policy: how many boards a match needs and which cells form one.

use autobattler_core::{HexCoord, BOARD_HEIGHT, BOARD_WIDTH, MAX_BOARD_COUNT};

/// Number of boards to materialize for the given layout origins and players.
///
/// Never exceeds either input nor [`MAX_BOARD_COUNT`]; any non-positive input
/// yields zero.
#[must_use]
pub fn calculate_board_count(origin_count: i32, player_count: i32) -> usize {
    if origin_count <= 0 || player_count <= 0 {
        return 0;
    }

    let origins = usize::try_from(origin_count).unwrap_or(0);
    let players = usize::try_from(player_count).unwrap_or(0);
    players.min(MAX_BOARD_COUNT.min(origins))
}

/// Every cell of one board in row-major order (`r` outer, `q` inner).
///
/// Each call starts a fresh sequence.
pub fn enumerate_board_coords() -> impl Iterator<Item = HexCoord> + Clone {
    (0..BOARD_HEIGHT).flat_map(|r| (0..BOARD_WIDTH).map(move |q| HexCoord::new(q, r)))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use autobattler_core::BOARD_CELL_COUNT;

    #[test]
    fn board_count_clamps_by_origins_players_and_max() {
        assert_eq!(calculate_board_count(10, 9), MAX_BOARD_COUNT);
        assert_eq!(calculate_board_count(3, 5), 3);
        assert_eq!(calculate_board_count(6, 2), 2);
    }

    #[test]
    fn board_count_is_zero_for_non_positive_inputs() {
        assert_eq!(calculate_board_count(0, 1), 0);
        assert_eq!(calculate_board_count(4, 0), 0);
        assert_eq!(calculate_board_count(-2, 4), 0);
    }

    #[test]
    fn enumeration_covers_whole_board_once() {
        let cells: Vec<_> = enumerate_board_coords().collect();
        let distinct: BTreeSet<_> = cells.iter().copied().collect();

        assert_eq!(cells.len(), BOARD_CELL_COUNT);
        assert_eq!(distinct.len(), BOARD_CELL_COUNT);
        assert!(cells.iter().all(|cell| {
            (0..BOARD_WIDTH).contains(&cell.q()) && (0..BOARD_HEIGHT).contains(&cell.r())
        }));
    }

    #[test]
    fn enumeration_is_row_major_and_restartable() {
        let first: Vec<_> = enumerate_board_coords().take(8).collect();
        assert_eq!(first[0], HexCoord::new(0, 0));
        assert_eq!(first[6], HexCoord::new(6, 0));
        assert_eq!(first[7], HexCoord::new(0, 1));

        let again: Vec<_> = enumerate_board_coords().take(8).collect();
        assert_eq!(first, again);
        assert_eq!(enumerate_board_coords().last(), Some(HexCoord::new(6, 7)));
    }
}
