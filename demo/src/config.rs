//! CLI configuration for the demo binary.

use std::time::Duration;

use clap::Parser;

/// CLI arguments for the demo.
#[derive(Debug, Parser)]
#[command(name = "demo")]
#[command(about = "Flipdown demo board with TUI visualization")]
pub struct DemoConfig {
    /// Seconds added to every sample target.
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pub base_offset: f64,

    /// Interval between theme toggles in milliseconds.
    #[arg(
        short,
        long,
        default_value = "5000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub theme_interval_ms: u64,
}

impl DemoConfig {
    /// Returns the theme toggle interval as a Duration.
    pub const fn theme_interval(&self) -> Duration {
        Duration::from_millis(self.theme_interval_ms)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { base_offset: 0.0, theme_interval_ms: 5000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parser() {
        let parsed = DemoConfig::parse_from(["demo"]);
        let default = DemoConfig::default();
        assert_eq!(parsed.base_offset, default.base_offset);
        assert_eq!(parsed.theme_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_negative_offset() {
        let parsed = DemoConfig::parse_from(["demo", "--base-offset", "-30", "-t", "250"]);
        assert_eq!(parsed.base_offset, -30.0);
        assert_eq!(parsed.theme_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(DemoConfig::try_parse_from(["demo", "--theme-interval-ms", "0"]).is_err());
        assert!(DemoConfig::try_parse_from(["demo", "--theme-interval-ms", "1"]).is_ok());
    }
}
