//! Clock options and their serializable overrides.
//!
//! [`ClockOptions`] is the fully typed option set a clock is built from.
//! Every clock starts from its own `ClockOptions::default()`.
//! [`ClockOverrides`] is the option bag read from TOML or JSON: each key is
//! optional, unknown keys are ignored, and [`ClockOverrides::apply`]
//! replaces only the keys that are present.

use std::{fmt, path::Path, sync::Arc, time::Duration};

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{DigitsMode, Direction, HeadingPosition};

/// How long a rotor flip takes before it settles on the timer fallback.
pub const FLIP_DURATION: Duration = Duration::from_millis(500);

/// Theme applied when none is configured.
pub const DEFAULT_THEME: &str = "dark";

/// Callback invoked every tick with the signed seconds remaining and the
/// sampled time.
pub type TickCallback = Arc<dyn Fn(f64, f64) + Send + Sync>;

/// Callback invoked once when the countdown ends, with the sampled time.
pub type EndedCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Returns the default group headings.
pub fn default_headings() -> [String; 4] {
    ["Days", "Hours", "Minutes", "Seconds"].map(String::from)
}

/// Returns the default delimiters. The day group has none.
pub fn default_delimiters() -> [String; 4] {
    ["", ":", ":", ":"].map(String::from)
}

/// How a started flip gets settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleMode {
    /// Settle after a fixed delay.
    Timer(Duration),
    /// Wait for the render surface to report the end of the animation.
    Surface,
}

impl Default for SettleMode {
    fn default() -> Self {
        Self::Timer(FLIP_DURATION)
    }
}

/// Options for a single clock.
#[derive(Clone)]
pub struct ClockOptions {
    /// Theme name passed to the surface.
    pub theme: String,
    /// Headings for the four groups, or `None` for no headings.
    pub headings: Option<[String; 4]>,
    /// Heading placement.
    pub headings_at: HeadingPosition,
    /// Glyphs drawn before each group, or `None` for no delimiters.
    /// Empty glyphs are skipped.
    pub delimiters: Option<[String; 4]>,
    /// Which groups are shown.
    pub digits: DigitsMode,
    /// Initial rotor count of every group, replacing the computed width.
    pub rotor: Option<usize>,
    /// Count down to the epoch or up from it.
    pub direction: Direction,
    /// Hold at zero once the epoch passes instead of counting overtime.
    pub stop_at_end: bool,
    /// How flips settle.
    pub settle: SettleMode,
    /// Called every tick.
    pub on_tick: Option<TickCallback>,
    /// Called once when the countdown ends.
    pub on_ended: Option<EndedCallback>,
}

impl Default for ClockOptions {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            headings: Some(default_headings()),
            headings_at: HeadingPosition::Top,
            delimiters: Some(default_delimiters()),
            digits: DigitsMode::Auto,
            rotor: None,
            direction: Direction::Down,
            stop_at_end: true,
            settle: SettleMode::default(),
            on_tick: None,
            on_ended: None,
        }
    }
}

impl fmt::Debug for ClockOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockOptions")
            .field("theme", &self.theme)
            .field("headings", &self.headings)
            .field("headings_at", &self.headings_at)
            .field("delimiters", &self.delimiters)
            .field("digits", &self.digits)
            .field("rotor", &self.rotor)
            .field("direction", &self.direction)
            .field("stop_at_end", &self.stop_at_end)
            .field("settle", &self.settle)
            .field("on_tick", &self.on_tick.is_some())
            .field("on_ended", &self.on_ended.is_some())
            .finish()
    }
}

impl ClockOptions {
    /// Sets the theme.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Sets the settle mode.
    pub const fn with_settle(mut self, settle: SettleMode) -> Self {
        self.settle = settle;
        self
    }

    /// Sets the tick callback.
    pub fn on_tick(mut self, callback: impl Fn(f64, f64) + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Arc::new(callback));
        self
    }

    /// Sets the end callback.
    pub fn on_ended(mut self, callback: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.on_ended = Some(Arc::new(callback));
        self
    }
}

/// A heading or delimiter setting as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelsSetting {
    /// Explicit labels; anything but four of them disables the feature.
    Labels(Vec<String>),
    /// `true` keeps the defaults, `false` disables the feature.
    Enabled(bool),
    /// `null`, disables the feature.
    Off,
}

impl LabelsSetting {
    /// Resolves the setting against the built-in defaults.
    pub fn resolve(self, defaults: impl FnOnce() -> [String; 4]) -> Option<[String; 4]> {
        match self {
            Self::Labels(labels) => <[String; 4]>::try_from(labels).ok(),
            Self::Enabled(true) => Some(defaults()),
            Self::Enabled(false) | Self::Off => None,
        }
    }
}

/// Partial clock options, as read from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClockOverrides {
    /// Theme name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Group headings.
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub headings: Option<LabelsSetting>,
    /// Heading placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headings_at: Option<HeadingPosition>,
    /// Delimiter glyphs.
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub delimiters: Option<LabelsSetting>,
    /// Which groups are shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digits: Option<DigitsMode>,
    /// Rotor count override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotor: Option<usize>,
    /// Count direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Hold at zero after the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_at_end: Option<bool>,
}

// A key that is present, even as `null`, is an override.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ClockOverrides {
    /// Parses overrides from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Parses overrides from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Loads overrides from a file, JSON if the extension says so and TOML
    /// otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Applies the present keys on top of `options`.
    pub fn apply(self, mut options: ClockOptions) -> ClockOptions {
        if let Some(theme) = self.theme {
            options.theme = theme;
        }
        if let Some(headings) = self.headings {
            options.headings = headings.resolve(default_headings);
        }
        if let Some(headings_at) = self.headings_at {
            options.headings_at = headings_at;
        }
        if let Some(delimiters) = self.delimiters {
            options.delimiters = delimiters.resolve(default_delimiters);
        }
        if let Some(digits) = self.digits {
            options.digits = digits;
        }
        if let Some(rotor) = self.rotor {
            options.rotor = Some(rotor);
        }
        if let Some(direction) = self.direction {
            options.direction = direction;
        }
        if let Some(stop_at_end) = self.stop_at_end {
            options.stop_at_end = stop_at_end;
        }
        options
    }
}

/// Errors that can occur while loading overrides.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("failed to parse toml config: {0}")]
    Toml(toml::de::Error),

    /// Failed to parse JSON.
    #[error("failed to parse json config: {0}")]
    Json(serde_json::Error),
}
