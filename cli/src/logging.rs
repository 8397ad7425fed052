use log::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Routes `log` records from the game core to stderr.
///
/// `RUST_LOG` wins over the verbosity flags when set.
pub fn init_logging(level: LevelFilter) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}
