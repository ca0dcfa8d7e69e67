use ndarray::Array2;

use super::*;

/// Uniform placement without replacement: every draw picks a rank among the
/// still-free cells and scans to that cell, so a cell can never be chosen
/// twice and no retry loop is needed, even on nearly-full boards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GridConfig) -> Minefield {
        use rand::prelude::*;

        let mut mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut free_cells = config.total_cells();
        let mut rng = SmallRng::seed_from_u64(self.seed);

        {
            let cells = mask.as_slice_mut().expect("layout should be standard");
            for _ in 0..config.mines {
                if free_cells == 0 {
                    break;
                }

                let mut rank = rng.random_range(0..free_cells);
                for cell in cells.iter_mut() {
                    if *cell {
                        continue;
                    }
                    if rank == 0 {
                        *cell = true;
                        free_cells -= 1;
                        break;
                    }
                    rank -= 1;
                }
            }
        }

        let minefield = Minefield::from_mask(mask);
        if minefield.mine_count() != config.mines {
            log::warn!(
                "generated mine count mismatch, actual: {}, requested: {}",
                minefield.mine_count(),
                config.mines
            );
        }
        minefield
    }
}
