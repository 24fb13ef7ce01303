use ndarray::Array2;
use rand::prelude::*;

use super::MinefieldGenerator;
use crate::{Difficulty, Minefield, Pos, in_bounds};

/// Uniform random placement: the mine budget is drawn without replacement
/// from the free cells via a partial shuffle, so the requested count is
/// always hit exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    excluded: Vec<Pos>,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            excluded: Vec::new(),
        }
    }

    /// Keeps the given cells free of mines, as long as enough free cells
    /// remain for the full mine budget.
    pub fn excluding(mut self, cells: impl IntoIterator<Item = Pos>) -> Self {
        self.excluded.extend(cells);
        self
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, difficulty: Difficulty) -> Minefield {
        let size = difficulty.size();
        let (_, cols) = size;
        let total = difficulty.total_cells();

        let mut keep_clear = vec![false; total];
        for &pos in &self.excluded {
            if in_bounds(pos, size) {
                keep_clear[pos.0 * cols + pos.1] = true;
            }
        }

        let mut free: Vec<usize> = (0..total).filter(|&cell| !keep_clear[cell]).collect();
        if free.len() < difficulty.mines {
            log::warn!(
                "exclusion leaves {} free cells for {} mines, ignoring it",
                free.len(),
                difficulty.mines
            );
            free = (0..total).collect();
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (picked, _) = free.partial_shuffle(&mut rng, difficulty.mines);

        let mut mines = Array2::from_elem(size, false);
        for &cell in picked.iter() {
            mines[(cell / cols, cell % cols)] = true;
        }

        Minefield::from_mine_mask(mines)
    }
}
