use serde::{Deserialize, Serialize};

/// Manual annotation cycled onto an unrevealed cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagMark {
    None,
    Flag,
    Question,
}

/// Player-visible state of one grid cell.
///
/// `Exploded`, `Mine` and `WrongFlag` only appear once a session ends: the
/// triggered mine, the mines that carried no flag, and the flagged cells that
/// held no mine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Hidden,
    Revealed(u8),
    Flagged,
    Questioned,
    Exploded,
    Mine,
    WrongFlag,
}

impl Cell {
    /// Whether the cell still shows its covered face.
    pub const fn is_closed(self) -> bool {
        use Cell::*;
        match self {
            Hidden => true,
            Revealed(_) => false,
            Flagged => true,
            Questioned => true,
            Exploded => false,
            Mine => false,
            WrongFlag => true,
        }
    }

    pub const fn mark(self) -> FlagMark {
        match self {
            Self::Flagged => FlagMark::Flag,
            Self::Questioned => FlagMark::Question,
            _ => FlagMark::None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_annotated_cells_carry_a_mark() {
        assert_eq!(Cell::Flagged.mark(), FlagMark::Flag);
        assert_eq!(Cell::Questioned.mark(), FlagMark::Question);
        assert_eq!(Cell::Hidden.mark(), FlagMark::None);
        assert_eq!(Cell::Revealed(3).mark(), FlagMark::None);
        assert_eq!(Cell::WrongFlag.mark(), FlagMark::None);
    }

    #[test]
    fn disclosure_states_read_as_open() {
        assert!(Cell::Hidden.is_closed());
        assert!(Cell::WrongFlag.is_closed());
        assert!(!Cell::Revealed(0).is_closed());
        assert!(!Cell::Exploded.is_closed());
        assert!(!Cell::Mine.is_closed());
    }
}
