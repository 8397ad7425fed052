#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use connect::*;
pub use error::*;
pub use events::*;
pub use grid::*;
pub use scheduler::*;
pub use session::*;
pub use symbol::*;
pub use types::*;

mod board;
mod connect;
mod error;
mod events;
mod grid;
mod scheduler;
mod session;
mod symbol;
mod types;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid.
    pub size: Coord,
    /// Countdown length in seconds.
    pub duration_secs: u32,
    /// Points awarded per matched pair.
    pub match_reward: u32,
    /// How long a connection stays visible before its cells are cleared.
    pub match_delay_ms: Millis,
    /// Pause between a clear and the check for remaining moves.
    pub solvability_delay_ms: Millis,
    /// Length of one countdown step.
    pub tick_ms: Millis,
    pub palette: Palette,
}

impl GameConfig {
    /// Largest grid side accepted, keeping the search costs bounded.
    pub const MAX_SIZE: Coord = 32;

    pub fn validate(&self) -> Result<()> {
        if !(1..=Self::MAX_SIZE).contains(&self.size) || self.duration_secs == 0 || self.tick_ms == 0 {
            return Err(GameError::InvalidConfig);
        }
        self.palette.validate()
    }

    /// Pulls out-of-range values back into what [`GameConfig::validate`] accepts.
    pub fn clamped(mut self) -> Self {
        let size = self.size.clamp(1, Self::MAX_SIZE);
        if size != self.size {
            log::warn!(
                "Grid size {} out of range, using {} instead",
                self.size,
                size
            );
            self.size = size;
        }
        if self.duration_secs == 0 {
            log::warn!("Countdown must be positive, using 1s");
            self.duration_secs = 1;
        }
        if self.tick_ms == 0 {
            log::warn!("Tick length must be positive, using 1000ms");
            self.tick_ms = 1000;
        }
        self
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: 8,
            duration_secs: 60,
            match_reward: 10,
            match_delay_ms: 200,
            solvability_delay_ms: 300,
            tick_ms: 1000,
            palette: Palette::default(),
        }
    }
}

/// Verdict shown next to the final score.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreRank {
    Sad,
    Fine,
    Cool,
    Star,
    Trophy,
}

impl ScoreRank {
    pub const fn from_score(score: u32) -> Self {
        use ScoreRank::*;
        match score {
            200.. => Trophy,
            150.. => Star,
            100.. => Cool,
            50.. => Fine,
            _ => Sad,
        }
    }

    pub const fn glyph(self) -> &'static str {
        use ScoreRank::*;
        match self {
            Trophy => "🏆",
            Star => "🌟",
            Cool => "😎",
            Fine => "🙂",
            Sad => "😢",
        }
    }
}
