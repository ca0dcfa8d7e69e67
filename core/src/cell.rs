use serde::{Deserialize, Serialize};

/// Player-visible state of a single board cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed(u8),
    /// A disclosed mine, only ever shown on a terminal board.
    Mine,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Mine)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    /// Digit drawn on a revealed safe cell; zero cells render blank.
    pub const fn digit(self) -> Option<u8> {
        match self {
            Self::Revealed(n) if n > 0 => Some(n),
            _ => None,
        }
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}
