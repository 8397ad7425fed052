use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use rand::rngs::SmallRng;
use tilelink_core as game;

use crate::view::TerminalView;

const HELP: &str = "commands: `row col` select, h hint, p pause, r resume, n new game, w refresh, q quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Select(game::Coord2),
    Hint,
    Pause,
    Resume,
    NewGame,
    Refresh,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let first = words.next().unwrap_or("w");
    let input = match first {
        "h" | "hint" => Input::Hint,
        "p" | "pause" => Input::Pause,
        "r" | "resume" => Input::Resume,
        "n" | "new" => Input::NewGame,
        "w" | "wait" => Input::Refresh,
        "q" | "quit" => Input::Quit,
        row => {
            let row = row.parse().ok()?;
            let col = words.next()?.parse().ok()?;
            Input::Select((row, col))
        }
    };
    words.next().is_none().then_some(input)
}

/// Wall clock feeding the session between prompts.
struct Clock {
    last: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn elapsed_ms(&mut self) -> game::Millis {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_millis();
        self.last = now;
        game::Millis::try_from(elapsed).unwrap_or(game::Millis::MAX)
    }
}

fn print_screen(session: &mut game::Session<SmallRng, TerminalView>) {
    for message in session.sink_mut().take_messages() {
        println!("  {message}");
    }
    if let Some(board) = session.board() {
        print!("{}", session.sink().render(board, &session.config().palette));
    }
    let state = match session.state() {
        game::SessionState::Paused => "   [paused]",
        _ => "",
    };
    println!("{}{}", session.sink().status_line(), state);
}

fn print_result(session: &game::Session<SmallRng, TerminalView>) {
    let rank = session.rank();
    println!("final score {} {}", session.score(), rank.glyph());
    if session.board().is_some_and(game::Board::is_cleared) {
        println!("board cleared!");
    }
}

pub fn run(config: game::GameConfig, rng: SmallRng) -> anyhow::Result<()> {
    let settle = Duration::from_millis(config.match_delay_ms.saturating_add(config.solvability_delay_ms));
    let mut session = game::Session::new(config, rng, TerminalView::default())
        .context("Failed to create game session")?;
    session.start().context("Failed to start game")?;

    println!("{HELP}");
    print_screen(&mut session);

    let mut clock = Clock::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        session.advance(clock.elapsed_ms());

        let input = parse_input(&line);
        if session.state().is_over() && !matches!(input, Some(Input::NewGame | Input::Quit)) {
            print_screen(&mut session);
            print_result(&session);
            println!("enter n for a new game or q to quit");
            continue;
        }

        match input {
            Some(Input::Quit) => break,
            Some(Input::Refresh) => {}
            Some(Input::Pause) => {
                if !session.pause() {
                    println!("nothing to pause");
                }
            }
            Some(Input::Resume) => {
                if !session.resume() {
                    println!("nothing to resume");
                }
                clock = Clock::new();
            }
            Some(Input::NewGame) => {
                session.start().context("Failed to start game")?;
                clock = Clock::new();
            }
            Some(Input::Hint) => match session.board().and_then(game::Board::find_move) {
                Some(hint) => println!("try {:?} and {:?}", hint.first, hint.second),
                None => println!("no moves left"),
            },
            Some(Input::Select(coords)) => {
                let in_bounds = session.board().is_some_and(|b| b.grid().in_bounds(coords));
                if !in_bounds {
                    println!("{coords:?} is outside the grid");
                } else {
                    session.select_cell(coords).context("Failed to select cell")?;
                    if session.sink().connection().is_some() {
                        print_screen(&mut session);
                        thread::sleep(settle);
                        session.advance(clock.elapsed_ms());
                    }
                }
            }
            None => println!("{HELP}"),
        }

        print_screen(&mut session);
        if session.sink().is_game_over() {
            print_result(&session);
        }
    }

    log::info!("Leaving with score {}", session.score());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_coordinates() {
        assert_eq!(parse_input("3 4"), Some(Input::Select((3, 4))));
        assert_eq!(parse_input("  h "), Some(Input::Hint));
        assert_eq!(parse_input(""), Some(Input::Refresh));
        assert_eq!(parse_input("quit"), Some(Input::Quit));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_input("3"), None);
        assert_eq!(parse_input("3 x"), None);
        assert_eq!(parse_input("1 2 3"), None);
        assert_eq!(parse_input("-1 2"), None);
        assert_eq!(parse_input("p now"), None);
    }
}
