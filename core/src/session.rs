use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Idle -> Playing
/// - Playing -> Paused -> Playing
/// - Playing -> Over
/// - any -> Playing, via `start`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Playing,
    Paused,
    Over,
}

impl SessionState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_over(self) -> bool {
        matches!(self, Self::Over)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Deferred {
    Tick { timer: Epoch },
    ApplyMatch { board: Epoch, a: Coord2, b: Coord2 },
    CheckMoves { board: Epoch },
}

/// One play attempt at a time: board, selection, countdown and score.
///
/// The session owns no clock. The adapter reports elapsed time through [`Session::advance`], and
/// every deferred effect (ticks, the post-match clear, the solvability check) runs from there.
pub struct Session<R, S> {
    config: GameConfig,
    rng: R,
    sink: S,
    state: SessionState,
    board: Option<Board>,
    selection: Option<Coord2>,
    score: u32,
    time_left: u32,
    scheduler: Scheduler<Deferred>,
    board_epoch: Epoch,
    timer_epoch: Epoch,
    next_tick_at: Millis,
    paused_tick_left: Millis,
    /// Pair whose connection is currently on screen.
    shown_pair: Option<(Coord2, Coord2)>,
}

impl<R: Rng, S: EventSink> Session<R, S> {
    pub fn new(config: GameConfig, rng: R, sink: S) -> Result<Self> {
        config.validate()?;
        let time_left = config.duration_secs;
        Ok(Self {
            config,
            rng,
            sink,
            state: SessionState::Idle,
            board: None,
            selection: None,
            score: 0,
            time_left,
            scheduler: Scheduler::new(),
            board_epoch: Epoch::default(),
            timer_epoch: Epoch::default(),
            next_tick_at: 0,
            paused_tick_left: 0,
            shown_pair: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rank(&self) -> ScoreRank {
        ScoreRank::from_score(self.score)
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn selection(&self) -> Option<Coord2> {
        self.selection
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Discards any previous game and starts a fresh random board.
    pub fn start(&mut self) -> Result<()> {
        let board = Board::new_board(self.config.size, &self.config.palette, &mut self.rng)?;
        self.start_with_board(board);
        Ok(())
    }

    /// Like [`Session::start`] with a prepared board.
    pub fn start_with_board(&mut self, board: Board) {
        self.scheduler.clear();
        self.board_epoch.bump();
        self.timer_epoch.bump();
        self.hide_connection();

        self.board = Some(board);
        self.selection = None;
        self.score = 0;
        self.time_left = self.config.duration_secs;
        self.state = SessionState::Playing;
        log::debug!(
            "Session started at {}ms, {}s on the clock",
            self.now(),
            self.time_left
        );

        self.sink.emit(SessionEvent::ScoreUpdate(self.score));
        self.sink.emit(SessionEvent::TimeUpdate(self.time_left));
        self.schedule_tick(self.config.tick_ms);
    }

    /// Suspends the countdown. Returns whether the session was playing.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }

        self.timer_epoch.bump();
        self.paused_tick_left = self.next_tick_at.saturating_sub(self.now());
        self.state = SessionState::Paused;
        log::debug!("Paused with {}ms left in the current second", self.paused_tick_left);
        true
    }

    /// Continues a paused countdown where it stopped. Returns whether the session was paused.
    pub fn resume(&mut self) -> bool {
        if !matches!(self.state, SessionState::Paused) {
            return false;
        }

        self.timer_epoch.bump();
        self.state = SessionState::Playing;
        self.schedule_tick(self.paused_tick_left);
        log::debug!("Resumed, next tick in {}ms", self.paused_tick_left);
        true
    }

    /// Handles a tap on `coords`. Ignored unless playing.
    pub fn select_cell(&mut self, coords: Coord2) -> Result<()> {
        if !self.state.is_playing() {
            return Ok(());
        }
        let Some(board) = &self.board else {
            return Ok(());
        };

        if board.symbol_at(coords)?.is_none() {
            if self.selection.take().is_some() {
                self.sink.emit(SessionEvent::CellDeselect);
            }
            self.hide_connection();
            return Ok(());
        }

        let Some(first) = self.selection.take() else {
            self.selection = Some(coords);
            self.sink.emit(SessionEvent::CellSelect(coords));
            return Ok(());
        };

        if first == coords {
            self.sink.emit(SessionEvent::CellDeselect);
            return Ok(());
        }

        match board.probe(first, coords)? {
            PathResult::Connected(path) => {
                log::debug!("Showing connection {:?} for {:?} <-> {:?}", path.points(), first, coords);
                self.shown_pair = Some((first, coords));
                self.sink.emit(SessionEvent::ShowConnection {
                    a: first,
                    b: coords,
                    path,
                });
                self.scheduler.schedule(
                    self.config.match_delay_ms,
                    Deferred::ApplyMatch {
                        board: self.board_epoch,
                        a: first,
                        b: coords,
                    },
                );
            }
            PathResult::NotConnected => {
                self.sink.emit(SessionEvent::InvalidMatch { a: first, b: coords });
            }
        }

        Ok(())
    }

    /// Feeds `elapsed` milliseconds to the session, running everything that came due in order.
    ///
    /// Time does not pass while the session is not playing.
    pub fn advance(&mut self, elapsed: Millis) {
        if !self.state.is_playing() {
            return;
        }

        let until = self.now().saturating_add(elapsed);
        while self.state.is_playing() {
            let Some((_, task)) = self.scheduler.pop_due(until) else {
                break;
            };
            self.run(task);
        }

        if self.state.is_playing() {
            self.scheduler.advance_to(until);
        }
    }

    /// Runs everything until the session is over, or `limit` ms of play have passed.
    pub fn run_until_over(&mut self, limit: Millis) {
        let deadline = self.now().saturating_add(limit);
        while self.state.is_playing() && self.now() < deadline {
            let step = self
                .scheduler
                .next_due()
                .map_or(deadline, |due| due.min(deadline))
                .saturating_sub(self.now());
            self.advance(step.max(1));
        }
    }

    fn run(&mut self, task: Deferred) {
        match task {
            Deferred::Tick { timer } if timer.is_current(self.timer_epoch) => self.tick(),
            Deferred::ApplyMatch { board, a, b } if board.is_current(self.board_epoch) => {
                self.apply_match(a, b)
            }
            Deferred::CheckMoves { board } if board.is_current(self.board_epoch) => {
                self.check_moves()
            }
            stale => log::trace!("Dropping stale task {:?} at {}ms", stale, self.now()),
        }
    }

    fn tick(&mut self) {
        self.time_left = self.time_left.saturating_sub(1);
        self.sink.emit(SessionEvent::TimeUpdate(self.time_left));

        if self.time_left == 0 {
            log::debug!("Time is up");
            self.end_game();
        } else {
            self.schedule_tick(self.config.tick_ms);
        }
    }

    fn apply_match(&mut self, a: Coord2, b: Coord2) {
        let Some(board) = &mut self.board else {
            return;
        };

        match board.attempt_match(a, b) {
            Ok(MatchOutcome::Matched(_)) => {
                self.hide_connection_of(a, b);
                self.sink.emit(SessionEvent::CellsMatch { a, b });
                self.score = self.score.saturating_add(self.config.match_reward);
                self.sink.emit(SessionEvent::ScoreUpdate(self.score));
                self.scheduler.schedule(
                    self.config.solvability_delay_ms,
                    Deferred::CheckMoves {
                        board: self.board_epoch,
                    },
                );
            }
            Ok(MatchOutcome::Rejected) => {
                log::debug!("Pending match {:?} <-> {:?} no longer applies", a, b);
                self.hide_connection_of(a, b);
            }
            Err(err) => {
                log::warn!("Discarding pending match {:?} <-> {:?}: {}", a, b, err);
                self.hide_connection_of(a, b);
            }
        }
    }

    fn check_moves(&mut self) {
        let has_move = self.board.as_ref().is_some_and(Board::has_any_move);
        if !has_move {
            self.end_game();
        }
    }

    /// Any deferred match still outstanding is discarded, not applied.
    fn end_game(&mut self) {
        if self.state.is_over() {
            return;
        }

        self.board_epoch.bump();
        self.timer_epoch.bump();
        self.selection = None;
        self.hide_connection();
        self.state = SessionState::Over;
        log::debug!("Game over with score {} ({:?})", self.score, self.rank());
        self.sink.emit(SessionEvent::GameOver);
    }

    fn schedule_tick(&mut self, delay: Millis) {
        self.next_tick_at = self.scheduler.schedule(
            delay,
            Deferred::Tick {
                timer: self.timer_epoch,
            },
        );
    }

    fn hide_connection(&mut self) {
        if self.shown_pair.take().is_some() {
            self.sink.emit(SessionEvent::HideConnection);
        }
    }

    /// Hides the connection only if it was drawn for this pair, in either order.
    fn hide_connection_of(&mut self, a: Coord2, b: Coord2) {
        if matches!(self.shown_pair, Some(pair) if pair == (a, b) || pair == (b, a)) {
            self.hide_connection();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn session() -> Session<SmallRng, Vec<SessionEvent>> {
        Session::new(GameConfig::default(), SmallRng::seed_from_u64(5), Vec::new()).unwrap()
    }

    #[test]
    fn new_session_is_idle_and_ignores_taps() {
        let mut session = session();

        session.select_cell((0, 0)).unwrap();
        session.advance(5_000);

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.sink().is_empty());
        assert_eq!(session.now(), 0);
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn start_resets_score_and_clock() {
        let mut session = session();
        session.start().unwrap();

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.board().map(Board::remaining), Some(64));
        assert_eq!(
            session.sink(),
            &[SessionEvent::ScoreUpdate(0), SessionEvent::TimeUpdate(60)]
        );
    }

    #[test]
    fn ticks_count_down_once_per_second() {
        let mut session = session();
        session.start().unwrap();
        session.sink_mut().clear();

        session.advance(2_500);

        assert_eq!(session.time_left(), 58);
        assert_eq!(
            session.sink(),
            &[SessionEvent::TimeUpdate(59), SessionEvent::TimeUpdate(58)]
        );
    }

    #[test]
    fn countdown_reaching_zero_ends_session() {
        let mut session = session();
        session.start().unwrap();

        session.advance(60_000);

        assert_eq!(session.state(), SessionState::Over);
        assert_eq!(session.time_left(), 0);
        assert_eq!(session.sink().last(), Some(&SessionEvent::GameOver));
    }

    #[test]
    fn invalid_config_is_rejected() {
        for config in [
            GameConfig {
                size: 0,
                ..GameConfig::default()
            },
            GameConfig {
                size: GameConfig::MAX_SIZE + 1,
                ..GameConfig::default()
            },
            GameConfig {
                duration_secs: 0,
                ..GameConfig::default()
            },
        ] {
            let result = Session::new(config, SmallRng::seed_from_u64(0), Vec::new());
            assert!(matches!(result, Err(GameError::InvalidConfig)));
        }
    }
}
