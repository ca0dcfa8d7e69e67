use alloc::collections::{BTreeSet, VecDeque};
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// One-way per game: `Playing -> Lost`. Restart means constructing a fresh grid.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GridState {
    Playing,
    Lost,
}

impl GridState {
    pub const fn is_lost(self) -> bool {
        matches!(self, Self::Lost)
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::Playing
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineGrid {
    minefield: Minefield,
    board: Array2<CellState>,
    flagged_count: Saturating<CellCount>,
    state: GridState,
    triggered_mine: Option<Pos>,
}

impl MineGrid {
    pub fn new(minefield: Minefield) -> Self {
        let size = minefield.size();
        Self {
            minefield,
            board: Array2::default(size.to_nd_index()),
            flagged_count: Saturating(0),
            state: Default::default(),
            triggered_mine: None,
        }
    }

    pub fn generate<G: MinefieldGenerator>(config: GridConfig, generator: G) -> Self {
        Self::new(generator.generate(config))
    }

    pub fn state(&self) -> GridState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_lost()
    }

    pub fn size(&self) -> Pos {
        self.minefield.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.minefield.mine_count()
    }

    /// Mines not yet flagged; goes negative when more flags than mines are placed.
    pub fn mines_left(&self) -> isize {
        (self.minefield.mine_count() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn cell_at(&self, pos: Pos) -> CellState {
        self.board[pos.to_nd_index()]
    }

    pub fn has_mine_at(&self, pos: Pos) -> bool {
        self.minefield.contains_mine(pos)
    }

    /// The mine that ended the game, if one was hit.
    pub fn triggered_mine(&self) -> Option<Pos> {
        self.triggered_mine
    }

    /// Reveals a hidden cell, or chords an already-revealed one.
    ///
    /// Chording opens every non-flagged, non-revealed neighbor, but only when
    /// the flagged-neighbor count matches the cell's number. Flagged cells and
    /// terminal boards are left untouched.
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let pos = self.minefield.validate(pos)?;

        if self.state.is_lost() {
            return Ok(NoChange);
        }

        Ok(match self.board[pos.to_nd_index()] {
            CellState::Revealed(number) if number == self.count_flagged_neighbors(pos) => self
                .neighbors(pos)
                .map(|neighbor| self.reveal_single(neighbor))
                .reduce(core::ops::BitOr::bitor)
                .unwrap_or(NoChange),
            CellState::Revealed(_) => NoChange,
            _ => self.reveal_single(pos),
        })
    }

    /// Flips `Hidden <-> Flagged`; revealed cells and terminal boards are untouched.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<MarkOutcome> {
        use CellState::*;
        use MarkOutcome::*;

        let pos = self.minefield.validate(pos)?;

        if self.state.is_lost() {
            return Ok(NoChange);
        }

        Ok(match self.board[pos.to_nd_index()] {
            Hidden => {
                self.board[pos.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                Changed
            }
            Flagged => {
                self.board[pos.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                Changed
            }
            Revealed(_) | Mine => NoChange,
        })
    }

    fn reveal_single(&mut self, pos: Pos) -> RevealOutcome {
        match (self.board[pos.to_nd_index()], self.minefield.contains_mine(pos)) {
            (CellState::Hidden, true) => {
                self.triggered_mine = Some(pos);
                self.disclose_all();
                RevealOutcome::HitMine
            }
            (CellState::Hidden, false) => {
                let number = self.minefield.adjacent_mines(pos);
                self.board[pos.to_nd_index()] = CellState::Revealed(number);
                log::debug!("revealed {:?}, adjacent mines: {}", pos, number);

                if number == 0 {
                    self.flood_from(pos)
                } else {
                    RevealOutcome::Revealed
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    /// Iterative flood reveal across the zero-region around `start`.
    fn flood_from(&mut self, start: Pos) -> RevealOutcome {
        let mut visited = BTreeSet::from([start]);
        let mut worklist: VecDeque<_> = self
            .neighbors(start)
            .filter(|&pos| matches!(self.board[pos.to_nd_index()], CellState::Hidden))
            .collect();

        while let Some(pos) = worklist.pop_front() {
            if !visited.insert(pos) {
                continue;
            }

            // skip cells flagged or revealed since they were enqueued
            if self.board[pos.to_nd_index()] != CellState::Hidden {
                continue;
            }

            // a mine bordering a zero cell means the layout is inconsistent;
            // it still detonates instead of being disclosed quietly
            if self.minefield.contains_mine(pos) {
                self.triggered_mine = Some(pos);
                self.disclose_all();
                return RevealOutcome::HitMine;
            }

            let number = self.minefield.adjacent_mines(pos);
            self.board[pos.to_nd_index()] = CellState::Revealed(number);
            log::trace!("flood revealed {:?}, adjacent mines: {}", pos, number);

            if number == 0 {
                let next = self
                    .neighbors(pos)
                    .filter(|&p| matches!(self.board[p.to_nd_index()], CellState::Hidden))
                    .filter(|p| !visited.contains(p));
                worklist.extend(next);
            }
        }

        RevealOutcome::Revealed
    }

    /// Terminal display: every cell shown, mines marked as such.
    fn disclose_all(&mut self) {
        self.state = GridState::Lost;

        let (rows, cols) = self.minefield.size();
        for row in 0..rows {
            for col in 0..cols {
                let pos = (row, col);
                self.board[pos.to_nd_index()] = if self.minefield.contains_mine(pos) {
                    CellState::Mine
                } else {
                    CellState::Revealed(self.minefield.adjacent_mines(pos))
                };
            }
        }
    }

    fn count_flagged_neighbors(&self, pos: Pos) -> u8 {
        self.neighbors(pos)
            .filter(|&p| self.board[p.to_nd_index()] == CellState::Flagged)
            .count()
            .try_into()
            .unwrap()
    }

    fn neighbors(&self, pos: Pos) -> Neighbors {
        self.minefield.iter_neighbors(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: Pos, mines: &[Pos]) -> MineGrid {
        MineGrid::new(Minefield::from_mine_positions(size, mines).unwrap())
    }

    #[test]
    fn revealing_a_mine_discloses_the_entire_board() {
        let mut g = grid((2, 2), &[(0, 0)]);

        assert_eq!(g.reveal((0, 0)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(g.state(), GridState::Lost);
        assert!(g.is_game_over());
        assert_eq!(g.triggered_mine(), Some((0, 0)));

        assert_eq!(g.cell_at((0, 0)), CellState::Mine);
        assert_eq!(g.cell_at((0, 1)), CellState::Revealed(1));
        assert_eq!(g.cell_at((1, 0)), CellState::Revealed(1));
        assert_eq!(g.cell_at((1, 1)), CellState::Revealed(1));
    }

    #[test]
    fn mineless_board_floods_in_one_reveal() {
        let mut g = grid((3, 3), &[]);

        assert_eq!(g.reveal((1, 1)).unwrap(), RevealOutcome::Revealed);
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(g.cell_at((row, col)), CellState::Revealed(0));
            }
        }
        assert_eq!(g.state(), GridState::Playing);
    }

    #[test]
    fn numbered_cell_reveals_without_propagating() {
        // one row of three cells, mine in the middle
        let mut g = grid((1, 3), &[(0, 1)]);

        assert_eq!(g.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(g.cell_at((0, 0)), CellState::Revealed(1));
        assert_eq!(g.cell_at((0, 2)), CellState::Hidden);
    }

    #[test]
    fn flood_stops_at_the_numbered_border() {
        let mut g = grid((3, 3), &[(2, 2)]);

        assert_eq!(g.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(g.cell_at((0, 0)), CellState::Revealed(0));
        assert_eq!(g.cell_at((1, 1)), CellState::Revealed(1));
        assert_eq!(g.cell_at((1, 2)), CellState::Revealed(1));
        assert_eq!(g.cell_at((2, 1)), CellState::Revealed(1));
        assert_eq!(g.cell_at((2, 2)), CellState::Hidden);
        assert_eq!(g.state(), GridState::Playing);
    }

    #[test]
    fn flood_never_opens_a_flagged_cell() {
        let mut g = grid((3, 3), &[]);

        g.toggle_flag((1, 1)).unwrap();
        g.reveal((0, 0)).unwrap();

        assert_eq!(g.cell_at((1, 1)), CellState::Flagged);
        assert_eq!(g.cell_at((2, 2)), CellState::Revealed(0));
    }

    #[test]
    fn revealing_a_flagged_cell_changes_nothing() {
        let mut g = grid((2, 2), &[(0, 0)]);

        g.toggle_flag((0, 0)).unwrap();
        assert_eq!(g.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(g.cell_at((0, 0)), CellState::Flagged);
        assert!(!g.is_game_over());
    }

    #[test]
    fn chord_with_matching_flags_opens_remaining_neighbors() {
        let mut g = grid((3, 3), &[(0, 0), (0, 2)]);

        assert_eq!(g.reveal((1, 1)).unwrap(), RevealOutcome::Revealed);
        g.toggle_flag((0, 0)).unwrap();
        g.toggle_flag((0, 2)).unwrap();

        assert_eq!(g.reveal((1, 1)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(g.cell_at((0, 1)), CellState::Revealed(2));
        assert_eq!(g.cell_at((1, 0)), CellState::Revealed(1));
        assert_eq!(g.cell_at((1, 2)), CellState::Revealed(1));
        assert_eq!(g.cell_at((0, 0)), CellState::Flagged);
        assert_eq!(g.cell_at((0, 2)), CellState::Flagged);
    }

    #[test]
    fn chord_with_mismatched_flags_is_a_noop() {
        let mut g = grid((3, 3), &[(0, 0), (0, 2)]);

        g.reveal((1, 1)).unwrap();
        g.toggle_flag((0, 0)).unwrap();

        assert_eq!(g.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(g.cell_at((0, 1)), CellState::Hidden);
    }

    #[test]
    fn chord_through_a_misplaced_flag_detonates() {
        let mut g = grid((2, 2), &[(0, 0)]);

        g.reveal((1, 1)).unwrap();
        g.toggle_flag((0, 1)).unwrap();

        assert_eq!(g.reveal((1, 1)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(g.state(), GridState::Lost);
        assert_eq!(g.cell_at((0, 0)), CellState::Mine);
        assert_eq!(g.cell_at((0, 1)), CellState::Revealed(1));
    }

    #[test]
    fn mines_left_tracks_toggles_and_may_go_negative() {
        let mut g = grid((2, 2), &[(0, 0)]);
        assert_eq!(g.mines_left(), 1);

        g.toggle_flag((0, 0)).unwrap();
        assert_eq!(g.mines_left(), 0);

        g.toggle_flag((0, 1)).unwrap();
        g.toggle_flag((1, 0)).unwrap();
        assert_eq!(g.mines_left(), -2);

        g.toggle_flag((1, 0)).unwrap();
        assert_eq!(g.mines_left(), -1);
    }

    #[test]
    fn flagging_a_revealed_cell_is_a_noop() {
        let mut g = grid((2, 2), &[(0, 0)]);

        g.reveal((1, 1)).unwrap();
        assert_eq!(g.toggle_flag((1, 1)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(g.cell_at((1, 1)), CellState::Revealed(1));
        assert_eq!(g.mines_left(), 1);
    }

    #[test]
    fn terminal_board_ignores_further_moves() {
        let mut g = grid((2, 2), &[(0, 0)]);
        g.reveal((0, 0)).unwrap();

        assert_eq!(g.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(g.toggle_flag((1, 1)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(g.cell_at((1, 1)), CellState::Revealed(1));
    }

    #[test]
    fn out_of_bounds_moves_are_rejected() {
        let mut g = grid((2, 2), &[(0, 0)]);

        assert_eq!(g.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(g.toggle_flag((0, 2)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn terminal_board_shows_content_under_flags() {
        let mut g = grid((2, 2), &[(0, 0)]);

        g.toggle_flag((1, 1)).unwrap();
        g.reveal((0, 0)).unwrap();

        assert_eq!(g.cell_at((1, 1)), CellState::Revealed(1));
    }
}
