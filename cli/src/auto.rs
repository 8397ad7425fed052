use anyhow::Context;
use rand::rngs::SmallRng;
use tilelink_core as game;

use crate::view::TerminalView;

type AutoSession = game::Session<SmallRng, TerminalView>;

fn flush_messages(session: &mut AutoSession) {
    let now = session.now();
    for message in session.sink_mut().take_messages() {
        println!("[{now:>6}ms] {message}");
    }
}

/// Plays one move from the hint finder. Returns false once no move is left.
fn play_move(session: &mut AutoSession, pace_ms: game::Millis) -> anyhow::Result<bool> {
    let Some(hint) = session.board().and_then(game::Board::find_move) else {
        return Ok(false);
    };

    session.advance(pace_ms);
    if !session.state().is_playing() {
        return Ok(true);
    }

    log::debug!("Auto move {:?} <-> {:?}", hint.first, hint.second);
    session.select_cell(hint.first).context("Failed to select first cell")?;
    session.select_cell(hint.second).context("Failed to select second cell")?;
    flush_messages(session);

    let config = session.config();
    let settle = config.match_delay_ms.saturating_add(config.solvability_delay_ms);
    session.advance(settle);
    flush_messages(session);
    Ok(true)
}

pub fn run(config: game::GameConfig, rng: SmallRng, pace_ms: game::Millis) -> anyhow::Result<()> {
    let limit = game::Millis::from(config.duration_secs).saturating_mul(config.tick_ms);
    let mut session = game::Session::new(config, rng, TerminalView::default())
        .context("Failed to create game session")?;
    session.start().context("Failed to start game")?;

    if let Some(board) = session.board() {
        print!("{}", session.sink().render(board, &session.config().palette));
    }

    while session.state().is_playing() {
        if !play_move(&mut session, pace_ms)? {
            log::info!("No moves left for the hint finder, running out the clock");
            session.run_until_over(limit);
            break;
        }
    }
    flush_messages(&mut session);

    if let Some(board) = session.board() {
        print!("{}", session.sink().render(board, &session.config().palette));
    }
    println!("{}", session.sink().status_line());
    println!(
        "final score {} {} after {}ms",
        session.score(),
        session.rank().glyph(),
        session.now()
    );
    Ok(())
}
