use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates out of bounds")]
    OutOfBounds,
    #[error("Required callbacks missing: score update, time update and game over must be set")]
    InvalidCallbackSet,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Unknown symbol in board description")]
    InvalidSymbol,
    #[error("Path must be 2 to 4 distinct points joined by straight segments")]
    InvalidPath,
    #[error("Invalid game configuration")]
    InvalidConfig,
}

pub type Result<T> = core::result::Result<T, GameError>;
