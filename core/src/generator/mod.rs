use crate::{Difficulty, Minefield};

pub use random::RandomMinefieldGenerator;

mod random;

/// Strategy for placing mines at the start of a session.
pub trait MinefieldGenerator {
    fn generate(self, difficulty: Difficulty) -> Minefield;
}
