use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tilelink_core as game;

mod auto;
mod logging;
mod play;
mod settings;
mod view;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// TOML file with game settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Grid side length
    #[arg(long, global = true)]
    size: Option<game::Coord>,

    /// Countdown length in seconds
    #[arg(long, global = true)]
    duration: Option<u32>,

    /// Use this many plain letters instead of emoji
    #[arg(long, global = true)]
    letters: Option<u8>,

    /// Force a seed instead of random
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play interactively, entering `row col` to pick cells
    Play,
    /// Let the hint finder play a game on a simulated clock
    Auto {
        /// Simulated thinking time before each move
        #[arg(long, default_value_t = 400)]
        pace_ms: game::Millis,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose.log_level_filter());

    let overrides = settings::Overrides {
        size: args.size,
        duration_secs: args.duration,
        letters: args.letters,
    };
    let config = settings::load(args.config.as_deref(), &overrides)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed: {}", seed);
    let rng = SmallRng::seed_from_u64(seed);

    match args.command {
        Command::Play => play::run(config, rng),
        Command::Auto { pace_ms } => auto::run(config, rng, pace_ms),
    }
}
