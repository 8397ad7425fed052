use core::fmt;
use core::ops::Index;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square matrix of symbol-or-empty cells.
///
/// The side length is fixed at construction. The only mutation is [`Grid::clear`].
/// Serialized as the bare cell matrix; the side length is recovered from its shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Array2<Option<Symbol>>",
    into = "Array2<Option<Symbol>>"
)]
pub struct Grid {
    size: Coord,
    cells: Array2<Option<Symbol>>,
}

impl Grid {
    /// Fills every cell independently and uniformly at random from `palette`.
    pub fn random<R: Rng + ?Sized>(size: Coord, palette: &Palette, rng: &mut R) -> Result<Self> {
        if size == 0 {
            return Err(GameError::InvalidConfig);
        }
        palette.validate()?;

        let choices = palette.len();
        let cells = Array2::from_shape_simple_fn((size, size).to_nd_index(), || {
            Some(Symbol(rng.random_range(0..choices) as u8))
        });
        log::debug!(
            "Generated {}x{} grid from {} symbols",
            size,
            size,
            choices
        );

        Ok(Self { size, cells })
    }

    /// Builds a grid from one string per row: `.` is empty, `A`..`Z` are symbols 0..25.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let size: Coord = rows
            .len()
            .try_into()
            .map_err(|_| GameError::InvalidBoardShape)?;
        if size == 0 {
            return Err(GameError::InvalidBoardShape);
        }

        let mut cells = Array2::from_elem((size, size).to_nd_index(), None);
        for (row, line) in rows.iter().enumerate() {
            let mut width = 0;
            for (col, ch) in line.chars().enumerate() {
                if col >= rows.len() {
                    return Err(GameError::InvalidBoardShape);
                }
                cells[[row, col]] = match ch {
                    '.' => None,
                    ch => Some(Symbol::from_letter(ch).ok_or(GameError::InvalidSymbol)?),
                };
                width += 1;
            }
            if width != rows.len() {
                return Err(GameError::InvalidBoardShape);
            }
        }

        Ok(Self { size, cells })
    }

    pub fn from_cells(cells: Array2<Option<Symbol>>) -> Result<Self> {
        let (rows, cols) = cells.dim();
        if rows != cols || rows == 0 {
            return Err(GameError::InvalidBoardShape);
        }
        let size = rows.try_into().map_err(|_| GameError::InvalidBoardShape)?;
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> Coord {
        self.size
    }

    pub fn in_bounds(&self, (row, col): Coord2) -> bool {
        row < self.size && col < self.size
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn get(&self, coords: Coord2) -> Result<Option<Symbol>> {
        let coords = self.validate_coords(coords)?;
        Ok(self[coords])
    }

    pub fn is_empty(&self, coords: Coord2) -> Result<bool> {
        Ok(self.get(coords)?.is_none())
    }

    /// Vacates a cell, returning the symbol it held.
    pub fn clear(&mut self, coords: Coord2) -> Result<Option<Symbol>> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()].take())
    }

    pub fn occupied_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.is_some())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Every cell in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Option<Symbol>)> + '_ {
        row_major(self.size).map(|coords| (coords, self[coords]))
    }

    /// Occupied cells in row-major order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (Coord2, Symbol)> + '_ {
        self.iter_cells()
            .filter_map(|(coords, cell)| cell.map(|symbol| (coords, symbol)))
    }
}

impl TryFrom<Array2<Option<Symbol>>> for Grid {
    type Error = GameError;

    fn try_from(cells: Array2<Option<Symbol>>) -> Result<Self> {
        Self::from_cells(cells)
    }
}

impl From<Grid> for Array2<Option<Symbol>> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}

impl Index<Coord2> for Grid {
    type Output = Option<Symbol>;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = match self[(row, col)] {
                    None => '.',
                    Some(symbol) => symbol.letter().unwrap_or('?'),
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
