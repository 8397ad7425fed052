use alloc::vec::Vec;
use hashbrown::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Both cells were cleared along this path.
    Matched(Path),
    /// Nothing changed.
    Rejected,
}

impl MatchOutcome {
    pub const fn has_update(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// A connectable pair found on the board, first cell before second in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub first: Coord2,
    pub second: Coord2,
    pub path: Path,
}

/// Owns the grid for one session and applies matches to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    grid: Grid,
}

impl Board {
    pub fn new_board<R: Rng + ?Sized>(size: Coord, palette: &Palette, rng: &mut R) -> Result<Self> {
        Grid::random(size, palette, rng).map(Self::from_grid)
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> Coord {
        self.grid.size()
    }

    pub fn symbol_at(&self, coords: Coord2) -> Result<Option<Symbol>> {
        self.grid.get(coords)
    }

    pub fn remaining(&self) -> CellCount {
        self.grid.occupied_count()
    }

    pub fn is_cleared(&self) -> bool {
        self.grid.is_cleared()
    }

    /// Path the pair would be matched along, without clearing anything.
    pub fn probe(&self, a: Coord2, b: Coord2) -> Result<PathResult> {
        connect(&self.grid, a, b)
    }

    /// Clears `a` and `b` if they hold the same symbol and are connectable.
    pub fn attempt_match(&mut self, a: Coord2, b: Coord2) -> Result<MatchOutcome> {
        let Some(path) = connect(&self.grid, a, b)?.into_path() else {
            log::debug!("Rejected match {:?} <-> {:?}", a, b);
            return Ok(MatchOutcome::Rejected);
        };

        self.grid.clear(a)?;
        self.grid.clear(b)?;
        log::debug!(
            "Matched {:?} <-> {:?} ({:?}), {} cells left",
            a,
            b,
            path.strategy(),
            self.remaining()
        );

        Ok(MatchOutcome::Matched(path))
    }

    /// First connectable pair of equal symbols, if any.
    ///
    /// First cells are scanned in row-major order and partners after them in row-major order, so the
    /// answer is deterministic for a given grid.
    pub fn find_move(&self) -> Option<Move> {
        let mut by_symbol: HashMap<Symbol, Vec<Coord2>> = HashMap::new();
        for (coords, symbol) in self.grid.iter_occupied() {
            by_symbol.entry(symbol).or_default().push(coords);
        }

        for (first, symbol) in self.grid.iter_occupied() {
            let Some(group) = by_symbol.get(&symbol) else {
                continue;
            };

            for &second in group.iter().filter(|&&other| other > first) {
                if let Some(path) = self.connect_in_bounds(first, second) {
                    return Some(Move {
                        first,
                        second,
                        path,
                    });
                }
            }
        }

        None
    }

    /// Whether any pair can still be matched. False on a cleared board.
    pub fn has_any_move(&self) -> bool {
        let found = self.find_move().is_some();
        if !found {
            log::debug!("No moves left with {} cells remaining", self.remaining());
        }
        found
    }

    fn connect_in_bounds(&self, a: Coord2, b: Coord2) -> Option<Path> {
        connect(&self.grid, a, b).ok().and_then(PathResult::into_path)
    }
}
