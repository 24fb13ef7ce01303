use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

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

/// Board shape and mine budget for one session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

impl Difficulty {
    pub const BEGINNER: Difficulty = Difficulty {
        rows: 8,
        cols: 8,
        mines: 10,
    };
    pub const INTERMEDIATE: Difficulty = Difficulty {
        rows: 16,
        cols: 16,
        mines: 40,
    };
    pub const EXPERT: Difficulty = Difficulty {
        rows: 24,
        cols: 24,
        mines: 99,
    };

    /// Validated custom difficulty. Out-of-range values are rejected, never
    /// silently adjusted.
    pub fn new(rows: usize, cols: usize, mines: usize) -> Result<Self> {
        let difficulty = Self { rows, cols, mines };
        difficulty.validate()?;
        Ok(difficulty)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::InvalidDimensions);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::InsufficientSpace);
        }
        Ok(())
    }

    pub const fn size(&self) -> Pos {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Mine placement for one session: which cells hold mines.
///
/// Adjacency is derived per query from the mask; nothing else is cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mines: Array2<bool>,
    count: usize,
}

impl Minefield {
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let count = mines.iter().filter(|&&mine| mine).count();
        Self { mines, count }
    }

    /// Layout with mines at exactly `mine_coords`; mostly useful for tests
    /// and replays.
    pub fn from_mine_coords(size: Pos, mine_coords: &[Pos]) -> Result<Self> {
        let (rows, cols) = size;
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let mut mines = Array2::from_elem(size, false);
        for &pos in mine_coords {
            if !in_bounds(pos, size) {
                return Err(GameError::InvalidCoords);
            }
            mines[pos] = true;
        }
        Ok(Self::from_mine_mask(mines))
    }

    pub fn size(&self) -> Pos {
        self.mines.dim()
    }

    pub fn total_cells(&self) -> usize {
        self.mines.len()
    }

    pub fn mine_count(&self) -> usize {
        self.count
    }

    /// Cells that must all be revealed to win.
    pub fn safe_cell_count(&self) -> usize {
        self.total_cells() - self.count
    }

    /// Out-of-bounds positions hold no mine.
    pub fn contains_mine(&self, pos: Pos) -> bool {
        in_bounds(pos, self.size()) && self.mines[pos]
    }

    /// Mines in the Moore neighborhood of `pos`, in 0..=8.
    pub fn adjacent_mines(&self, pos: Pos) -> u8 {
        self.neighbors(pos).filter(|&p| self.mines[p]).count() as u8
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + use<> {
        neighbors(pos, self.size())
    }
}

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of revealing a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Exploded,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Exploded => true,
            Won => true,
        }
    }
}

/// Used to merge per-cell outcomes when chording.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (Exploded, _) => Exploded,
            (_, Exploded) => Exploded,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in [
            Difficulty::BEGINNER,
            Difficulty::INTERMEDIATE,
            Difficulty::EXPERT,
        ] {
            assert_eq!(preset.validate(), Ok(()));
        }
    }

    #[test]
    fn difficulty_rejects_zero_dimensions() {
        assert_eq!(Difficulty::new(0, 8, 1), Err(GameError::InvalidDimensions));
        assert_eq!(Difficulty::new(8, 0, 1), Err(GameError::InvalidDimensions));
    }

    #[test]
    fn difficulty_rejects_mine_counts_that_fill_the_board() {
        assert_eq!(Difficulty::new(2, 2, 4), Err(GameError::InsufficientSpace));
        assert_eq!(Difficulty::new(2, 2, 5), Err(GameError::InsufficientSpace));
        assert!(Difficulty::new(2, 2, 3).is_ok());
    }

    #[test]
    fn minefield_rejects_out_of_bounds_mines() {
        let result = Minefield::from_mine_coords((4, 4), &[(1, 1), (4, 0)]);
        assert_eq!(result.unwrap_err(), GameError::InvalidCoords);
    }

    #[test]
    fn corner_mine_counts_toward_three_neighbors() {
        let field = Minefield::from_mine_coords((8, 8), &[(0, 0)]).unwrap();
        assert_eq!(field.adjacent_mines((0, 1)), 1);
        assert_eq!(field.adjacent_mines((1, 0)), 1);
        assert_eq!(field.adjacent_mines((1, 1)), 1);
        assert_eq!(field.adjacent_mines((2, 2)), 0);
        // the mine's own cell counts neighbors only
        assert_eq!(field.adjacent_mines((0, 0)), 0);
    }

    #[test]
    fn minefield_counts_cells() {
        let field = Minefield::from_mine_coords((3, 4), &[(0, 0), (2, 3)]).unwrap();
        assert_eq!(field.total_cells(), 12);
        assert_eq!(field.mine_count(), 2);
        assert_eq!(field.safe_cell_count(), 10);
        assert!(field.contains_mine((2, 3)));
        assert!(!field.contains_mine((1, 1)));
        assert!(!field.contains_mine((9, 9)));
    }

    #[test]
    fn exploded_dominates_merged_outcomes() {
        use RevealOutcome::*;
        assert_eq!(NoChange | Revealed, Revealed);
        assert_eq!(Revealed | Won, Won);
        assert_eq!(Won | Exploded, Exploded);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
