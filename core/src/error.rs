use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be positive")]
    InvalidDimensions,
    #[error("Mine count must be smaller than the cell count")]
    InsufficientSpace,
    #[error("Coordinates outside the board")]
    InvalidCoords,
}

pub type Result<T> = std::result::Result<T, GameError>;
