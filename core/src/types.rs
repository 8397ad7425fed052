/// Single coordinate axis used for the grid side and for positions.
pub type Coord = u8;

/// Count type used for cell totals.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Iterates every coordinate of a `size × size` grid, row ascending then column ascending.
///
/// This order is the tie-break for every search that has to pick one of several candidates.
pub fn row_major(size: Coord) -> RowMajorIter {
    RowMajorIter::new(size)
}

#[derive(Clone, Debug)]
pub struct RowMajorIter {
    size: Coord,
    next: CellCount,
}

impl RowMajorIter {
    fn new(size: Coord) -> Self {
        Self { size, next: 0 }
    }
}

impl Iterator for RowMajorIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 || self.next >= mult(self.size, self.size) {
            return None;
        }

        let side = CellCount::from(self.size);
        let row = (self.next / side) as Coord;
        let col = (self.next % side) as Coord;
        self.next += 1;
        Some((row, col))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::from(mult(self.size, self.size).saturating_sub(self.next));
        (left, Some(left))
    }
}

impl ExactSizeIterator for RowMajorIter {}
