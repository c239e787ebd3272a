//! Match-level container: one board per connected participant plus the round phase.

use autobattler_core::{Authority, Event, FlowError, FlowState, MAX_PLAYER_COUNT};
use tracing::{info, warn};

use crate::{plan, BoardManager};

/// Boards of a single match and the phase the round is in.
#[derive(Clone, Debug, Default)]
pub struct Arena {
    boards: Vec<BoardManager>,
    flow_state: FlowState,
}

impl Arena {
    /// Creates an arena with no boards in the idle phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lays out fresh boards for the connected players and enters preparation.
    ///
    /// Any previous boards are discarded. Players beyond [`MAX_PLAYER_COUNT`]
    /// are ignored and the board count is further limited by the number of
    /// layout origins available. Returns how many boards now exist.
    pub fn start_flow_for_connected_players(
        &mut self,
        authority: Authority,
        origin_count: usize,
        connected_players: usize,
        out_events: &mut Vec<Event>,
    ) -> Result<usize, FlowError> {
        if !authority.can_write() {
            warn!("flow start requested without authority");
            return Err(FlowError::NotAuthorized);
        }

        let players = connected_players.min(MAX_PLAYER_COUNT);
        let board_count = plan::calculate_board_count(
            i32::try_from(origin_count).unwrap_or(i32::MAX),
            i32::try_from(players).unwrap_or(i32::MAX),
        );

        self.boards = vec![BoardManager::new(); board_count];
        info!(board_count, players, origin_count, "boards generated");
        self.transition(FlowState::Preparation, out_events);
        Ok(board_count)
    }

    /// Enters the combat phase.
    pub fn start_combat(
        &mut self,
        authority: Authority,
        out_events: &mut Vec<Event>,
    ) -> Result<(), FlowError> {
        if !authority.can_write() {
            return Err(FlowError::NotAuthorized);
        }
        self.transition(FlowState::Combat, out_events);
        Ok(())
    }

    /// Enters the result phase.
    pub fn finish_round(
        &mut self,
        authority: Authority,
        out_events: &mut Vec<Event>,
    ) -> Result<(), FlowError> {
        if !authority.can_write() {
            return Err(FlowError::NotAuthorized);
        }
        self.transition(FlowState::Result, out_events);
        Ok(())
    }

    /// Phase the round is currently in.
    #[must_use]
    pub const fn flow_state(&self) -> FlowState {
        self.flow_state
    }

    /// All boards in participant order.
    #[must_use]
    pub fn boards(&self) -> &[BoardManager] {
        &self.boards
    }

    /// Board assigned to the participant at `index`.
    #[must_use]
    pub fn board(&self, index: usize) -> Option<&BoardManager> {
        self.boards.get(index)
    }

    /// Mutable board assigned to the participant at `index`.
    #[must_use]
    pub fn board_mut(&mut self, index: usize) -> Option<&mut BoardManager> {
        self.boards.get_mut(index)
    }

    fn transition(&mut self, state: FlowState, out_events: &mut Vec<Event>) {
        if self.flow_state == state {
            return;
        }
        self.flow_state = state;
        info!(?state, "flow state changed");
        out_events.push(Event::FlowStateChanged { state });
    }
}
