use std::fmt::Write;

use tilelink_core as game;

/// Terminal presentation state, fed only through session events.
#[derive(Debug, Default)]
pub struct TerminalView {
    score: u32,
    time_left: u32,
    selected: Option<game::Coord2>,
    connection: Option<game::Path>,
    game_over: bool,
    messages: Vec<String>,
}

impl TerminalView {
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn connection(&self) -> Option<&game::Path> {
        self.connection.as_ref()
    }

    /// Messages collected since the last call.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn status_line(&self) -> String {
        let mut line = format!("score {:>4}   time {:>3}s", self.score, self.time_left);
        if let Some((row, col)) = self.selected {
            let _ = write!(line, "   selected {row} {col}");
        }
        line
    }

    /// Draws the grid with column and row labels. Cells on the shown connection are marked.
    pub fn render(&self, board: &game::Board, palette: &game::Palette) -> String {
        let grid = board.grid();
        let size = grid.size();
        let on_path = |coords: game::Coord2| {
            self.connection
                .as_ref()
                .is_some_and(|path| path_covers(path, coords))
        };

        let mut out = String::from("    ");
        for col in 0..size {
            let _ = write!(out, "{col:<3}");
        }
        out.push('\n');

        for row in 0..size {
            let _ = write!(out, "{row:>2}  ");
            for col in 0..size {
                let coords = (row, col);
                let glyph = match grid[coords] {
                    Some(symbol) => palette.glyph(symbol).unwrap_or("?"),
                    None if on_path(coords) => "**",
                    None => "··",
                };
                let marker = if self.selected == Some(coords) { '<' } else { ' ' };
                let _ = write!(out, "{glyph}{marker}");
            }
            out.push('\n');
        }
        out
    }
}

impl game::EventSink for TerminalView {
    fn emit(&mut self, event: game::SessionEvent) {
        use game::SessionEvent::*;

        log::trace!("view event: {:?}", event);
        match event {
            ScoreUpdate(score) => self.score = score,
            TimeUpdate(time_left) => {
                // A running countdown means a game is live again after a restart.
                self.game_over &= time_left == 0;
                self.time_left = time_left;
            }
            GameOver => {
                self.game_over = true;
                self.selected = None;
                self.messages.push("game over".to_string());
            }
            CellSelect(coords) => self.selected = Some(coords),
            CellDeselect => self.selected = None,
            ShowConnection { a, b, path } => {
                self.selected = None;
                self.messages.push(format!(
                    "{:?} -> {:?} via {:?} {:?}",
                    a,
                    b,
                    path.strategy(),
                    path.bends()
                ));
                self.connection = Some(path);
            }
            HideConnection => self.connection = None,
            CellsMatch { a, b } => self.messages.push(format!("matched {a:?} and {b:?}")),
            InvalidMatch { a, b } => {
                self.selected = None;
                self.messages.push(format!("{a:?} and {b:?} do not connect"));
            }
        }
    }
}

fn path_covers(path: &game::Path, (row, col): game::Coord2) -> bool {
    path.segments().any(|((r1, c1), (r2, c2))| {
        (r1 == r2 && r1 == row && (c1.min(c2)..=c1.max(c2)).contains(&col))
            || (c1 == c2 && c1 == col && (r1.min(r2)..=r1.max(r2)).contains(&row))
    })
}
