//! Configuration for the flipdown binary.
//!
//! Supports loading configuration from a TOML file, environment variables,
//! or CLI arguments.

use std::path::Path;

use clap::Parser;
use flipdown::{ClockOverrides, Direction, Target};
use serde::{Deserialize, Serialize};

/// CLI arguments for flipdown.
#[derive(Debug, Parser)]
#[command(name = "flipdown")]
#[command(about = "Flip styled countdown clock in the terminal")]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, env = "FLIPDOWN_CONFIG")]
    pub config: Option<String>,

    /// Instant to count toward: unix seconds or an RFC 3339 date-time.
    #[arg(short, long, env = "FLIPDOWN_TARGET")]
    pub target: Option<String>,

    /// Count toward this many seconds from now instead of a fixed target.
    #[arg(long, env = "FLIPDOWN_IN_SECONDS")]
    pub in_seconds: Option<f64>,

    /// Theme name.
    #[arg(long, env = "FLIPDOWN_THEME")]
    pub theme: Option<String>,

    /// Count "down" to the target or "up" from it.
    #[arg(long, env = "FLIPDOWN_DIRECTION", value_parser = parse_direction)]
    pub direction: Option<Direction>,

    /// Keep counting overtime once the target has passed.
    #[arg(long, env = "FLIPDOWN_NO_STOP_AT_END")]
    pub no_stop_at_end: bool,

    /// Exit as soon as the countdown ends.
    #[arg(long, env = "FLIPDOWN_EXIT_ON_END")]
    pub exit_on_end: bool,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    match s {
        "down" => Ok(Direction::Down),
        "up" => Ok(Direction::Up),
        other => Err(format!("expected \"down\" or \"up\", got {other:?}")),
    }
}

/// Configuration for the flipdown binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instant to count toward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Relative target in seconds, preferred over `target`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_seconds: Option<f64>,

    /// Exit once the countdown ends.
    pub exit_on_end: bool,

    /// Clock option overrides.
    pub clock: ClockOverrides,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Load configuration from CLI arguments, optionally overriding a config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_cli(Cli::parse())
    }

    fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        // Start with config file if provided
        let mut config =
            if let Some(ref path) = cli.config { Self::from_file(path)? } else { Self::default() };

        // CLI args override config file values
        if let Some(target) = cli.target {
            config.target = Some(target);
            config.in_seconds = None;
        }
        if let Some(in_seconds) = cli.in_seconds {
            config.in_seconds = Some(in_seconds);
        }
        if let Some(theme) = cli.theme {
            config.clock.theme = Some(theme);
        }
        if let Some(direction) = cli.direction {
            config.clock.direction = Some(direction);
        }
        if cli.no_stop_at_end {
            config.clock.stop_at_end = Some(false);
        }
        config.exit_on_end |= cli.exit_on_end;

        Ok(config)
    }

    /// Resolves the target relative to `now`, if one is configured.
    pub fn target(&self, now: f64) -> Option<Target> {
        match (self.in_seconds, &self.target) {
            (Some(seconds), _) => Some(Target::Seconds(now + seconds)),
            (None, Some(target)) => Some(Target::from(target.as_str())),
            (None, None) => None,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse configuration file.
    #[error("failed to parse config: {0}")]
    Parse(toml::de::Error),
}
