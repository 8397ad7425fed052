use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::*;

/// Which search produced a [`Path`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// One straight segment.
    Direct,
    /// Two segments meeting at one empty corner.
    OneBend,
    /// Three segments meeting at two empty corners.
    TwoBend,
}

/// Axis-aligned polyline `[start, bend.., end]` with 2 to 4 points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPath")]
pub struct Path {
    points: SmallVec<[Coord2; 4]>,
}

#[derive(Deserialize)]
struct RawPath {
    points: SmallVec<[Coord2; 4]>,
}

impl TryFrom<RawPath> for Path {
    type Error = GameError;

    fn try_from(raw: RawPath) -> Result<Self> {
        let points = raw.points;
        if !(2..=4).contains(&points.len()) {
            return Err(GameError::InvalidPath);
        }
        let straight = points
            .windows(2)
            .all(|pair| pair[0] != pair[1] && (pair[0].0 == pair[1].0 || pair[0].1 == pair[1].1));
        if !straight {
            return Err(GameError::InvalidPath);
        }
        Ok(Self { points })
    }
}

impl Path {
    fn direct(a: Coord2, b: Coord2) -> Self {
        Self {
            points: smallvec![a, b],
        }
    }

    fn one_bend(a: Coord2, corner: Coord2, b: Coord2) -> Self {
        Self {
            points: smallvec![a, corner, b],
        }
    }

    fn two_bend(a: Coord2, bend1: Coord2, bend2: Coord2, b: Coord2) -> Self {
        Self {
            points: smallvec![a, bend1, bend2, b],
        }
    }

    pub fn points(&self) -> &[Coord2] {
        &self.points
    }

    pub fn start(&self) -> Coord2 {
        self.points[0]
    }

    pub fn end(&self) -> Coord2 {
        self.points[self.points.len() - 1]
    }

    /// Corner points between start and end, in travel order.
    pub fn bends(&self) -> &[Coord2] {
        &self.points[1..self.points.len() - 1]
    }

    pub fn strategy(&self) -> Strategy {
        match self.points.len() {
            2 => Strategy::Direct,
            3 => Strategy::OneBend,
            _ => Strategy::TwoBend,
        }
    }

    /// Consecutive point pairs, one per straight segment.
    pub fn segments(&self) -> impl Iterator<Item = (Coord2, Coord2)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathResult {
    NotConnected,
    Connected(Path),
}

impl PathResult {
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotConnected => None,
            Self::Connected(path) => Some(path),
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            Self::NotConnected => None,
            Self::Connected(path) => Some(path),
        }
    }
}

impl From<Option<Path>> for PathResult {
    fn from(path: Option<Path>) -> Self {
        path.map_or(Self::NotConnected, Self::Connected)
    }
}

/// Looks for a path of at most two bends between `a` and `b` through empty cells.
///
/// Searches run in fixed priority: direct, then one bend, then two bends. The first hit wins, so
/// the reported path is canonical for a given grid:
///
/// - the one-bend corner `(a.row, b.col)` is preferred over `(b.row, a.col)`;
/// - two-bend candidates are scanned in row-major order for the first bend, and for each reachable
///   first bend, in row-major order for the second. The lexicographically smallest pair wins.
///
/// Identical, empty, or mismatched cells are `NotConnected`. Coordinates outside the grid are an
/// error. The grid is never modified.
pub fn connect(grid: &Grid, a: Coord2, b: Coord2) -> Result<PathResult> {
    let a = grid.validate_coords(a)?;
    let b = grid.validate_coords(b)?;

    if a == b {
        return Ok(PathResult::NotConnected);
    }

    match (grid[a], grid[b]) {
        (Some(first), Some(second)) if first == second => {}
        _ => return Ok(PathResult::NotConnected),
    }

    let path = find_direct(grid, a, b)
        .or_else(|| find_one_bend(grid, a, b))
        .or_else(|| find_two_bend(grid, a, b));

    match &path {
        Some(path) => log::trace!(
            "Connected {:?} -> {:?} via {:?} {:?}",
            a,
            b,
            path.strategy(),
            path.bends()
        ),
        None => log::trace!("No path between {:?} and {:?}", a, b),
    }

    Ok(path.into())
}

/// Whether `a` and `b` share a row or column with every cell strictly between them empty.
pub fn is_direct_clear(grid: &Grid, a: Coord2, b: Coord2) -> Result<bool> {
    let a = grid.validate_coords(a)?;
    let b = grid.validate_coords(b)?;
    Ok(direct_clear(grid, a, b))
}

fn direct_clear(grid: &Grid, (row1, col1): Coord2, (row2, col2): Coord2) -> bool {
    if row1 == row2 {
        let (lo, hi) = (col1.min(col2), col1.max(col2));
        ((lo + 1)..hi).all(|col| grid[(row1, col)].is_none())
    } else if col1 == col2 {
        let (lo, hi) = (row1.min(row2), row1.max(row2));
        ((lo + 1)..hi).all(|row| grid[(row, col1)].is_none())
    } else {
        false
    }
}

fn is_free_bend(grid: &Grid, coords: Coord2) -> bool {
    grid.in_bounds(coords) && grid[coords].is_none()
}

fn find_direct(grid: &Grid, a: Coord2, b: Coord2) -> Option<Path> {
    direct_clear(grid, a, b).then(|| Path::direct(a, b))
}

fn find_one_bend(grid: &Grid, a: Coord2, b: Coord2) -> Option<Path> {
    [(a.0, b.1), (b.0, a.1)]
        .into_iter()
        .find(|&corner| {
            is_free_bend(grid, corner)
                && direct_clear(grid, a, corner)
                && direct_clear(grid, corner, b)
        })
        .map(|corner| Path::one_bend(a, corner, b))
}

fn find_two_bend(grid: &Grid, a: Coord2, b: Coord2) -> Option<Path> {
    let size = grid.size();

    for bend1 in row_major(size) {
        if !is_free_bend(grid, bend1) || !direct_clear(grid, a, bend1) {
            continue;
        }

        for bend2 in row_major(size) {
            if bend2 == bend1 || !is_free_bend(grid, bend2) {
                continue;
            }

            if direct_clear(grid, bend1, bend2) && direct_clear(grid, bend2, b) {
                return Some(Path::two_bend(a, bend1, bend2, b));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    fn path_of(grid: &Grid, a: Coord2, b: Coord2) -> Option<Path> {
        connect(grid, a, b).unwrap().into_path()
    }

    /// Random boards with roughly half of the cells already cleared.
    fn sparse_grid(seed: u64) -> Grid {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut grid = Grid::random(6, &Palette::letters(3), &mut rng).unwrap();
        for coords in row_major(6) {
            if rng.random_bool(0.5) {
                grid.clear(coords).unwrap();
            }
        }
        grid
    }

    #[test]
    fn direct_path_along_row_and_column() {
        let g = grid(&["A..A", "....", "....", "A..."]);

        let row = path_of(&g, (0, 0), (0, 3)).unwrap();
        assert_eq!(row.points(), &[(0, 0), (0, 3)]);
        assert_eq!(row.strategy(), Strategy::Direct);

        let col = path_of(&g, (0, 0), (3, 0)).unwrap();
        assert_eq!(col.points(), &[(0, 0), (3, 0)]);
    }

    #[test]
    fn adjacent_cells_connect_directly() {
        let g = grid(&["AA", "BB"]);
        let path = path_of(&g, (0, 0), (0, 1)).unwrap();
        assert_eq!(path.strategy(), Strategy::Direct);
    }

    #[test]
    fn one_bend_prefers_corner_on_first_row() {
        let g = grid(&["A..", "...", "..A"]);

        let path = path_of(&g, (0, 0), (2, 2)).unwrap();

        assert_eq!(path.strategy(), Strategy::OneBend);
        assert_eq!(path.bends(), &[(0, 2)]);
    }

    #[test]
    fn one_bend_falls_back_to_second_corner() {
        let g = grid(&["A.B", "...", "..A"]);

        let path = path_of(&g, (0, 0), (2, 2)).unwrap();

        assert_eq!(path.points(), &[(0, 0), (2, 0), (2, 2)]);
    }

    #[test]
    fn one_bend_requires_both_legs_clear() {
        let g = grid(&["AB.", "C..", "..A"]);
        let path = path_of(&g, (0, 0), (2, 2));
        assert_eq!(path, None);
    }

    #[test]
    fn two_bends_around_blocked_column() {
        let g = grid(&["A..B", "C...", "C...", "A..B"]);

        let path = path_of(&g, (0, 0), (3, 0)).unwrap();

        assert_eq!(path.strategy(), Strategy::TwoBend);
        assert_eq!(path.points(), &[(0, 0), (0, 1), (3, 1), (3, 0)]);
    }

    #[test]
    fn two_bends_pick_smallest_row_major_pair() {
        // Both the detour over row 0 and the one under row 2 are valid.
        let g = grid(&["....", "ABCA", "....", "...."]);

        let path = path_of(&g, (1, 0), (1, 3)).unwrap();

        assert_eq!(path.bends(), &[(0, 0), (0, 3)]);
    }

    #[test]
    fn walled_in_cells_do_not_connect() {
        let g = grid(&["ABA", "BBB", "..."]);
        assert_eq!(connect(&g, (0, 0), (0, 2)), Ok(PathResult::NotConnected));
    }

    #[test]
    fn precondition_failures_are_not_connected() {
        let g = grid(&["AB", ".A"]);

        assert_eq!(connect(&g, (0, 0), (0, 0)), Ok(PathResult::NotConnected));
        assert_eq!(connect(&g, (0, 0), (0, 1)), Ok(PathResult::NotConnected));
        assert_eq!(connect(&g, (0, 0), (1, 0)), Ok(PathResult::NotConnected));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let g = grid(&["AA", ".."]);
        assert_eq!(connect(&g, (0, 0), (0, 2)), Err(GameError::OutOfBounds));
        assert_eq!(connect(&g, (9, 0), (0, 1)), Err(GameError::OutOfBounds));
        assert_eq!(is_direct_clear(&g, (0, 0), (2, 0)), Err(GameError::OutOfBounds));
    }

    #[test]
    fn search_leaves_grid_untouched() {
        let g = grid(&["A..B", "C...", "C...", "A..B"]);
        let before = g.clone();

        let _ = connect(&g, (0, 0), (3, 0)).unwrap();

        assert_eq!(g, before);
    }

    #[test]
    fn connect_is_symmetric() {
        for seed in 0..16 {
            let g = sparse_grid(seed);
            for a in row_major(6) {
                for b in row_major(6) {
                    let forward = connect(&g, a, b).unwrap().is_connected();
                    let backward = connect(&g, b, a).unwrap().is_connected();
                    assert_eq!(forward, backward, "seed {seed}, {a:?} <-> {b:?}\n{g}");
                }
            }
        }
    }

    #[test]
    fn connected_paths_are_axis_aligned_through_empty_cells() {
        for seed in 100..108 {
            let g = sparse_grid(seed);
            for a in row_major(6) {
                for b in row_major(6) {
                    let Some(path) = path_of(&g, a, b) else {
                        continue;
                    };

                    assert_eq!(path.start(), a);
                    assert_eq!(path.end(), b);
                    assert!(path.bends().iter().all(|&bend| g[bend].is_none()));
                    for (from, to) in path.segments() {
                        assert!(from.0 == to.0 || from.1 == to.1);
                        assert!(direct_clear(&g, from, to));
                    }
                }
            }
        }
    }

    #[test]
    fn deserialized_paths_are_checked() {
        let path: Path = serde_json::from_str(r#"{"points":[[0,0],[0,2],[3,2]]}"#).unwrap();
        assert_eq!(path.bends(), &[(0, 2)]);

        for bad in [
            r#"{"points":[]}"#,
            r#"{"points":[[1,1]]}"#,
            r#"{"points":[[0,0],[1,1]]}"#,
            r#"{"points":[[0,0],[0,0]]}"#,
            r#"{"points":[[0,0],[0,1],[1,1],[1,2],[2,2]]}"#,
        ] {
            assert!(serde_json::from_str::<Path>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn shown_connection_event_survives_serde() {
        let g = grid(&["A..B", "C...", "C...", "A..B"]);
        let event = SessionEvent::ShowConnection {
            a: (0, 0),
            b: (3, 0),
            path: path_of(&g, (0, 0), (3, 0)).unwrap(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: SessionEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(back, event);
    }

    #[test]
    fn reversed_path_swaps_endpoints() {
        let g = grid(&["A..B", "C...", "C...", "A..B"]);
        let path = path_of(&g, (0, 0), (3, 0)).unwrap().reversed();

        assert_eq!(path.points(), &[(3, 0), (3, 1), (0, 1), (0, 0)]);
        assert_eq!(path.strategy(), Strategy::TwoBend);
    }
}
