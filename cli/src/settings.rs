use std::fs;
use std::path::Path;

use anyhow::Context;
use tilelink_core as game;

/// Command line values that win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub size: Option<game::Coord>,
    pub duration_secs: Option<u32>,
    pub letters: Option<u8>,
}

/// Loads settings from `path` if given, applies overrides, then clamps and validates.
pub fn load(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<game::GameConfig> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            parse(&content).with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => game::GameConfig::default(),
    };

    let config = apply(config, overrides).clamped();
    config.validate().context("invalid game settings")?;
    log::debug!("{:?}", config);
    Ok(config)
}

fn parse(content: &str) -> anyhow::Result<game::GameConfig> {
    Ok(toml::from_str(content)?)
}

fn apply(mut config: game::GameConfig, overrides: &Overrides) -> game::GameConfig {
    if let Some(size) = overrides.size {
        config.size = size;
    }
    if let Some(duration_secs) = overrides.duration_secs {
        config.duration_secs = duration_secs;
    }
    if let Some(letters) = overrides.letters {
        config.palette = game::Palette::letters(letters);
    }
    config
}
