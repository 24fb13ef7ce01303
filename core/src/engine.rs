use chrono::prelude::*;
use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::ops::BitOr;

use crate::{
    Cell, Difficulty, FlagOutcome, Minefield, MinefieldGenerator, Pos, RandomMinefieldGenerator,
    Result, RevealOutcome, in_bounds,
};

/// Session status. `Won` and `Lost` are terminal: every further command is a
/// no-op until a fresh session replaces this one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Playing
    }
}

/// What one reveal command did: the merged outcome, the status the session
/// ended up in, and every cell whose display state changed, so a renderer
/// can redraw only the delta.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealDelta {
    pub outcome: RevealOutcome,
    pub status: GameStatus,
    pub changed: Vec<Pos>,
}

impl RevealDelta {
    fn no_change(status: GameStatus) -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            status,
            changed: Vec::new(),
        }
    }

    pub fn has_update(&self) -> bool {
        self.outcome.has_update()
    }
}

/// One playthrough from mine placement to a terminal win or loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    minefield: Minefield,
    grid: Array2<Cell>,
    revealed_count: usize,
    flag_count: usize,
    status: GameStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(minefield: Minefield) -> Game {
        let size = minefield.size();
        Self {
            minefield,
            grid: Array2::from_elem(size, Cell::Hidden),
            revealed_count: 0,
            flag_count: 0,
            status: GameStatus::Playing,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn size(&self) -> Pos {
        self.minefield.size()
    }

    pub fn rows(&self) -> usize {
        self.size().0
    }

    pub fn cols(&self) -> usize {
        self.size().1
    }

    pub fn mine_count(&self) -> usize {
        self.minefield.mine_count()
    }

    pub fn flag_count(&self) -> usize {
        self.flag_count
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// Mine budget not yet covered by a flag. Never negative: the flag cycle
    /// caps `flag_count` at the mine count.
    pub fn mines_left(&self) -> usize {
        self.minefield.mine_count() - self.flag_count
    }

    /// `None` outside the board.
    pub fn cell_at(&self, pos: Pos) -> Option<Cell> {
        in_bounds(pos, self.size()).then(|| self.grid[pos])
    }

    /// Whole seconds since the first reveal; 0 before it, frozen once the
    /// session ends.
    pub fn elapsed_secs(&self) -> u32 {
        match self.started_at {
            Some(started_at) => (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32,
            None => 0,
        }
    }

    /// Cycles the annotation on an unrevealed cell: nothing, flag, question
    /// mark, nothing again. Entering the flag state is refused once every
    /// mine has a flag. Out-of-bounds, revealed and post-game cells are left
    /// alone.
    pub fn toggle_flag(&mut self, pos: Pos) -> FlagOutcome {
        use Cell::*;
        use FlagOutcome::*;

        if self.status.is_finished() || !in_bounds(pos, self.size()) {
            return NoChange;
        }

        match self.grid[pos] {
            Hidden => {
                if self.flag_count == self.minefield.mine_count() {
                    log::debug!("flag budget exhausted, ignoring flag at {:?}", pos);
                    return NoChange;
                }
                self.grid[pos] = Flagged;
                self.flag_count += 1;
                Changed
            }
            Flagged => {
                self.grid[pos] = Questioned;
                self.flag_count -= 1;
                Changed
            }
            Questioned => {
                self.grid[pos] = Hidden;
                Changed
            }
            _ => NoChange,
        }
    }

    /// Reveals a hidden or questioned cell. A flagged cell must be unflagged
    /// first; out-of-bounds coordinates and terminal sessions are no-ops.
    pub fn reveal(&mut self, pos: Pos) -> RevealDelta {
        if self.status.is_finished() || !in_bounds(pos, self.size()) {
            return RevealDelta::no_change(self.status);
        }

        let mut changed = Vec::new();
        let outcome = self.reveal_cell(pos, &mut changed);
        RevealDelta {
            outcome,
            status: self.status,
            changed,
        }
    }

    /// On a revealed number whose flagged neighbors match it, reveals the
    /// remaining unflagged neighbors in one stroke. A misplaced flag makes
    /// this lose the game, so a questioned neighbor blocks it entirely.
    pub fn chord_reveal(&mut self, pos: Pos) -> RevealDelta {
        if self.status.is_finished() || !in_bounds(pos, self.size()) {
            return RevealDelta::no_change(self.status);
        }

        let Cell::Revealed(count) = self.grid[pos] else {
            return RevealDelta::no_change(self.status);
        };
        if count != self.count_flagged_neighbors(pos) || self.has_questioned_neighbor(pos) {
            return RevealDelta::no_change(self.status);
        }

        let mut changed = Vec::new();
        let outcome = self
            .minefield
            .neighbors(pos)
            .map(|neighbor| self.reveal_cell(neighbor, &mut changed))
            .reduce(BitOr::bitor)
            .unwrap_or(RevealOutcome::NoChange);
        RevealDelta {
            outcome,
            status: self.status,
            changed,
        }
    }

    /// Reveals a single cell and cascades from it, appending every touched
    /// position to `changed`.
    fn reveal_cell(&mut self, pos: Pos, changed: &mut Vec<Pos>) -> RevealOutcome {
        use Cell::*;

        if self.status.is_finished() || !matches!(self.grid[pos], Hidden | Questioned) {
            return RevealOutcome::NoChange;
        }

        if self.minefield.contains_mine(pos) {
            self.grid[pos] = Exploded;
            changed.push(pos);
            log::debug!("mine triggered at {:?}", pos);
            self.finish(false, changed);
            return RevealOutcome::Exploded;
        }

        let count = self.minefield.adjacent_mines(pos);
        self.grid[pos] = Revealed(count);
        self.revealed_count += 1;
        changed.push(pos);
        log::debug!("revealed {:?}, adjacent mines: {}", pos, count);

        if count == 0 {
            self.flood_from(pos, changed);
        }

        if self.revealed_count == self.minefield.safe_cell_count() {
            self.finish(true, changed);
            RevealOutcome::Won
        } else {
            self.mark_started();
            RevealOutcome::Revealed
        }
    }

    /// Work-list flood fill over the zero-count region around `origin` and
    /// its numbered border. The grid state doubles as the visited marker, so
    /// each cell is revealed at most once; flags stop the cascade, question
    /// marks do not.
    fn flood_from(&mut self, origin: Pos, changed: &mut Vec<Pos>) {
        use Cell::*;

        let mut visited = HashSet::from([origin]);
        let mut to_visit: VecDeque<Pos> = self
            .minefield
            .neighbors(origin)
            .filter(|&pos| matches!(self.grid[pos], Hidden | Questioned))
            .collect();

        while let Some(pos) = to_visit.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            if !matches!(self.grid[pos], Hidden | Questioned) {
                continue;
            }

            let count = self.minefield.adjacent_mines(pos);
            self.grid[pos] = Revealed(count);
            self.revealed_count += 1;
            changed.push(pos);
            log::trace!("flood revealed {:?}, adjacent mines: {}", pos, count);

            if count == 0 {
                let next: Vec<Pos> = self
                    .minefield
                    .neighbors(pos)
                    .filter(|&p| matches!(self.grid[p], Hidden | Questioned))
                    .filter(|p| !visited.contains(p))
                    .collect();
                to_visit.extend(next);
            }
        }
    }

    fn count_flagged_neighbors(&self, pos: Pos) -> u8 {
        self.minefield
            .neighbors(pos)
            .filter(|&p| self.grid[p] == Cell::Flagged)
            .count() as u8
    }

    fn has_questioned_neighbor(&self, pos: Pos) -> bool {
        self.minefield
            .neighbors(pos)
            .any(|p| self.grid[p] == Cell::Questioned)
    }

    fn mark_started(&mut self) {
        if self.started_at.is_none() {
            let now = Utc::now();
            log::debug!("session started at {}", now);
            self.started_at = Some(now);
        }
    }

    fn finish(&mut self, won: bool, changed: &mut Vec<Pos>) {
        self.status = if won { GameStatus::Won } else { GameStatus::Lost };
        let now = Utc::now();
        self.started_at.get_or_insert(now);
        self.ended_at = Some(now);
        log::debug!("session ended at {}, won: {}", now, won);
        self.disclose_mines(won, changed);
    }

    /// After the terminal transition, discloses the rest of the board: on a
    /// loss the unflagged mines and the wrong flags, on a win a flag on every
    /// mine still missing one.
    fn disclose_mines(&mut self, won: bool, changed: &mut Vec<Pos>) {
        use Cell::*;

        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                let pos = (row, col);
                let cell = self.grid[pos];
                if self.minefield.contains_mine(pos) {
                    if matches!(cell, Hidden | Questioned) {
                        if won {
                            self.grid[pos] = Flagged;
                            self.flag_count += 1;
                        } else {
                            self.grid[pos] = Mine;
                        }
                        changed.push(pos);
                    }
                } else if cell == Flagged {
                    self.grid[pos] = WrongFlag;
                    changed.push(pos);
                }
            }
        }
    }
}

/// Owns the current session and its difficulty. Commands are forwarded to
/// the session; `reset` and `set_difficulty` replace it wholesale, so no
/// state leaks from one playthrough into the next.
#[derive(Debug)]
pub struct GameEngine {
    difficulty: Difficulty,
    game: Game,
    rng: SmallRng,
}

impl GameEngine {
    /// Engine with OS-seeded randomness.
    pub fn new(difficulty: Difficulty) -> Result<Self> {
        Self::with_rng(difficulty, SmallRng::from_os_rng())
    }

    /// Deterministic engine: the seed fixes this session's layout and the
    /// layout of every later reset.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Result<Self> {
        Self::with_rng(difficulty, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, mut rng: SmallRng) -> Result<Self> {
        difficulty.validate()?;
        let game = Self::fresh_session(difficulty, &mut rng);
        Ok(Self {
            difficulty,
            game,
            rng,
        })
    }

    fn fresh_session(difficulty: Difficulty, rng: &mut SmallRng) -> Game {
        let seed = rng.random();
        Game::new(RandomMinefieldGenerator::new(seed).generate(difficulty))
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Discards the session and places mines afresh at the same difficulty.
    pub fn reset(&mut self) {
        self.game = Self::fresh_session(self.difficulty, &mut self.rng);
    }

    /// Switches to a new difficulty with a fresh session. A rejected
    /// difficulty leaves the current session untouched.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        difficulty.validate()?;
        self.difficulty = difficulty;
        self.reset();
        Ok(())
    }

    pub fn reveal(&mut self, pos: Pos) -> RevealDelta {
        self.game.reveal(pos)
    }

    pub fn chord_reveal(&mut self, pos: Pos) -> RevealDelta {
        self.game.chord_reveal(pos)
    }

    pub fn toggle_flag(&mut self, pos: Pos) -> FlagOutcome {
        self.game.toggle_flag(pos)
    }

    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    pub fn cell_at(&self, pos: Pos) -> Option<Cell> {
        self.game.cell_at(pos)
    }

    pub fn rows(&self) -> usize {
        self.game.rows()
    }

    pub fn cols(&self) -> usize {
        self.game.cols()
    }

    pub fn mine_count(&self) -> usize {
        self.game.mine_count()
    }

    pub fn flag_count(&self) -> usize {
        self.game.flag_count()
    }

    pub fn mines_left(&self) -> usize {
        self.game.mines_left()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.game.elapsed_secs()
    }
}
