//! Host configuration read from the environment.

use ludo_core::{BotDifficulty, GameConfig};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings for a batch of simulated games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Games to run
    pub games: u32,
    pub players: u8,
    pub difficulty: BotDifficulty,
    /// Base seed; game `i` uses `seed + i`
    pub seed: Option<u64>,
    /// Pause before every computer turn
    pub pace: Duration,
    /// Use each bot's own thinking delay instead of `pace`
    pub think_delays: bool,
    /// Games still running after this many turns are abandoned
    pub max_turns: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            games: 4,
            players: 4,
            difficulty: BotDifficulty::Medium,
            seed: None,
            pace: Duration::ZERO,
            think_delays: false,
            max_turns: 10_000,
        }
    }
}

impl HostConfig {
    /// Read `LUDO_*` variables, falling back to defaults for unset ones
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            games: parse_var(&lookup, "LUDO_GAMES")?.unwrap_or(defaults.games),
            players: parse_var(&lookup, "LUDO_PLAYERS")?.unwrap_or(defaults.players),
            difficulty: parse_var(&lookup, "LUDO_DIFFICULTY")?.unwrap_or(defaults.difficulty),
            seed: parse_var(&lookup, "LUDO_SEED")?,
            pace: parse_var(&lookup, "LUDO_PACE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.pace),
            think_delays: parse_var(&lookup, "LUDO_THINK_DELAYS")?
                .unwrap_or(defaults.think_delays),
            max_turns: parse_var(&lookup, "LUDO_MAX_TURNS")?.unwrap_or(defaults.max_turns),
        })
    }

    /// Game settings for the `index`-th simulated game
    pub fn game_config(&self, index: u32) -> GameConfig {
        let config = GameConfig::all_ai(self.players, self.difficulty);
        match self.seed {
            Some(seed) => config.with_seed(seed.wrapping_add(index as u64)),
            None => config,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
