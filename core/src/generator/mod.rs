use crate::*;
pub use random::*;

mod random;

/// Placement strategy seam; the engine itself never draws randomness.
pub trait MinefieldGenerator {
    fn generate(self, config: GridConfig) -> Minefield;
}
