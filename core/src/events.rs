use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Notifications pushed from a [`Session`] to its presentation layer, in transition order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    ScoreUpdate(u32),
    TimeUpdate(u32),
    GameOver,
    CellSelect(Coord2),
    CellDeselect,
    /// A pair was accepted; the line stays up until the deferred clear runs.
    ShowConnection { a: Coord2, b: Coord2, path: Path },
    HideConnection,
    CellsMatch { a: Coord2, b: Coord2 },
    /// Brief flash for a pair that cannot be matched. The pending selection is gone.
    InvalidMatch { a: Coord2, b: Coord2 },
}

pub trait EventSink {
    fn emit(&mut self, event: SessionEvent);
}

impl EventSink for Vec<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: SessionEvent) {
        (**self).emit(event);
    }
}

type Handler<Args> = Box<dyn FnMut(Args)>;

/// Closure-per-event sink.
///
/// Score, time and game-over handlers are required; the rest may be left out.
pub struct Callbacks {
    on_score_update: Handler<u32>,
    on_time_update: Handler<u32>,
    on_game_over: Handler<()>,
    on_cell_select: Option<Handler<Coord2>>,
    on_cell_deselect: Option<Handler<()>>,
    on_show_connection: Option<Handler<(Coord2, Coord2, Path)>>,
    on_hide_connection: Option<Handler<()>>,
    on_cells_match: Option<Handler<(Coord2, Coord2)>>,
    on_invalid_match: Option<Handler<(Coord2, Coord2)>>,
}

impl Callbacks {
    pub fn builder() -> CallbacksBuilder {
        CallbacksBuilder::default()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_cell_select", &self.on_cell_select.is_some())
            .field("on_cell_deselect", &self.on_cell_deselect.is_some())
            .field("on_show_connection", &self.on_show_connection.is_some())
            .field("on_hide_connection", &self.on_hide_connection.is_some())
            .field("on_cells_match", &self.on_cells_match.is_some())
            .field("on_invalid_match", &self.on_invalid_match.is_some())
            .finish_non_exhaustive()
    }
}

impl EventSink for Callbacks {
    fn emit(&mut self, event: SessionEvent) {
        use SessionEvent::*;

        fn call<Args>(handler: &mut Option<Handler<Args>>, args: Args) {
            if let Some(handler) = handler {
                handler(args);
            }
        }

        match event {
            ScoreUpdate(score) => (self.on_score_update)(score),
            TimeUpdate(seconds) => (self.on_time_update)(seconds),
            GameOver => (self.on_game_over)(()),
            CellSelect(coords) => call(&mut self.on_cell_select, coords),
            CellDeselect => call(&mut self.on_cell_deselect, ()),
            ShowConnection { a, b, path } => call(&mut self.on_show_connection, (a, b, path)),
            HideConnection => call(&mut self.on_hide_connection, ()),
            CellsMatch { a, b } => call(&mut self.on_cells_match, (a, b)),
            InvalidMatch { a, b } => call(&mut self.on_invalid_match, (a, b)),
        }
    }
}

#[derive(Default)]
pub struct CallbacksBuilder {
    on_score_update: Option<Handler<u32>>,
    on_time_update: Option<Handler<u32>>,
    on_game_over: Option<Handler<()>>,
    on_cell_select: Option<Handler<Coord2>>,
    on_cell_deselect: Option<Handler<()>>,
    on_show_connection: Option<Handler<(Coord2, Coord2, Path)>>,
    on_hide_connection: Option<Handler<()>>,
    on_cells_match: Option<Handler<(Coord2, Coord2)>>,
    on_invalid_match: Option<Handler<(Coord2, Coord2)>>,
}

impl CallbacksBuilder {
    pub fn on_score_update(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_score_update = Some(Box::new(f));
        self
    }

    pub fn on_time_update(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_time_update = Some(Box::new(f));
        self
    }

    pub fn on_game_over(mut self, mut f: impl FnMut() + 'static) -> Self {
        self.on_game_over = Some(Box::new(move |()| f()));
        self
    }

    pub fn on_cell_select(mut self, f: impl FnMut(Coord2) + 'static) -> Self {
        self.on_cell_select = Some(Box::new(f));
        self
    }

    pub fn on_cell_deselect(mut self, mut f: impl FnMut() + 'static) -> Self {
        self.on_cell_deselect = Some(Box::new(move |()| f()));
        self
    }

    pub fn on_show_connection(mut self, mut f: impl FnMut(Coord2, Coord2, &Path) + 'static) -> Self {
        self.on_show_connection = Some(Box::new(move |(a, b, path)| f(a, b, &path)));
        self
    }

    pub fn on_hide_connection(mut self, mut f: impl FnMut() + 'static) -> Self {
        self.on_hide_connection = Some(Box::new(move |()| f()));
        self
    }

    pub fn on_cells_match(mut self, mut f: impl FnMut(Coord2, Coord2) + 'static) -> Self {
        self.on_cells_match = Some(Box::new(move |(a, b)| f(a, b)));
        self
    }

    pub fn on_invalid_match(mut self, mut f: impl FnMut(Coord2, Coord2) + 'static) -> Self {
        self.on_invalid_match = Some(Box::new(move |(a, b)| f(a, b)));
        self
    }

    pub fn build(self) -> Result<Callbacks> {
        let (Some(on_score_update), Some(on_time_update), Some(on_game_over)) =
            (self.on_score_update, self.on_time_update, self.on_game_over)
        else {
            return Err(GameError::InvalidCallbackSet);
        };

        Ok(Callbacks {
            on_score_update,
            on_time_update,
            on_game_over,
            on_cell_select: self.on_cell_select,
            on_cell_deselect: self.on_cell_deselect,
            on_show_connection: self.on_show_connection,
            on_hide_connection: self.on_hide_connection,
            on_cells_match: self.on_cells_match,
            on_invalid_match: self.on_invalid_match,
        })
    }
}
