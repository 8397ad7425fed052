use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Index of a glyph in the active [`Palette`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub u8);

impl Symbol {
    /// Letter used by [`Grid::from_rows`] fixtures, `A` for symbol 0.
    pub fn letter(self) -> Option<char> {
        (self.0 < 26).then(|| char::from(b'A' + self.0))
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        letter
            .is_ascii_uppercase()
            .then(|| Self(letter as u8 - b'A'))
    }
}

/// Fixed set of glyphs a board is filled from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    glyphs: Vec<String>,
}

impl Palette {
    /// At most this many glyphs fit into a [`Symbol`].
    pub const MAX_LEN: usize = u8::MAX as usize + 1;

    pub fn new<I, S>(glyphs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette = Self {
            glyphs: glyphs.into_iter().map(Into::into).collect(),
        };
        palette.validate()?;
        Ok(palette)
    }

    /// Sixteen faces and animals.
    pub fn emoji() -> Self {
        const EMOJI: [&str; 16] = [
            "😀", "😎", "🥳", "😍", "🤪", "😇", "🤓", "🤠", "🐶", "🐱", "🐼", "🐨", "🦊", "🦁", "🐯",
            "🐸",
        ];
        Self {
            glyphs: EMOJI.iter().map(|glyph| glyph.to_string()).collect(),
        }
    }

    /// Plain `A`, `B`, ... glyphs, handy for terminals without emoji support.
    pub fn letters(count: u8) -> Self {
        let count = count.clamp(1, 26);
        Self {
            glyphs: (0..count)
                .filter_map(|i| Symbol(i).letter())
                .map(|letter| letter.to_string())
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.glyphs.is_empty() || self.glyphs.len() > Self::MAX_LEN {
            return Err(GameError::InvalidConfig);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph(&self, symbol: Symbol) -> Option<&str> {
        self.glyphs.get(usize::from(symbol.0)).map(String::as_str)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::emoji()
    }
}
