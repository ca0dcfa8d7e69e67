#![no_std]

extern crate alloc;

use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub size: Pos,
    pub mines: CellCount,
}

impl GridConfig {
    pub const fn new_unchecked(size: Pos, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Rejects boards without at least one safe cell; a mine count of zero is fine.
    pub fn new(size: Pos, mines: CellCount) -> Result<Self> {
        if mines >= area(size.0, size.1) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.size.0, self.size.1)
    }
}

/// Immutable mine placement. The mutable visibility layer lives in [`MineGrid`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mask: Array2<bool>,
    mine_count: CellCount,
}

impl Minefield {
    pub fn from_mask(mask: Array2<bool>) -> Self {
        let mine_count = mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();
        Self { mask, mine_count }
    }

    /// Deterministic layout for tests and scripted boards.
    pub fn from_mine_positions(size: Pos, mines: &[Pos]) -> Result<Self> {
        let mut mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &pos in mines {
            if pos.0 >= size.0 || pos.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mask[pos.to_nd_index()] = true;
        }

        Ok(Self::from_mask(mask))
    }

    pub fn validate(&self, pos: Pos) -> Result<Pos> {
        let size = self.size();
        if pos.0 < size.0 && pos.1 < size.1 {
            Ok(pos)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Pos {
        let dim = self.mask.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.mask.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, pos: Pos) -> bool {
        self[pos]
    }

    /// Mines in the bounds-clamped 8-neighborhood of `pos`.
    pub fn adjacent_mines(&self, pos: Pos) -> u8 {
        self.mask
            .neighbors(pos)
            .filter(|&p| self[p])
            .count()
            .try_into()
            .unwrap()
    }

    pub(crate) fn iter_neighbors(&self, pos: Pos) -> Neighbors {
        self.mask.neighbors(pos)
    }
}

impl Index<Pos> for Minefield {
    type Output = bool;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.mask[pos.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges per-cell outcomes when a chord opens several neighbors.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}
