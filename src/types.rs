//! Core types for the flipdown clock.
//!
//! This module contains the error type, the target instant, the four time
//! units and their decomposed values, and the small addressing types shared
//! between the clock and its render surface.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds in a day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in an hour.
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// Seconds in a minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Errors that can occur while constructing a clock.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The target is neither epoch seconds nor a recognizable instant.
    #[error("invalid target instant: {0}")]
    InvalidArgument(String),

    /// The render surface anchor could not be located.
    #[error("render surface anchor not found: {0}")]
    MissingMount(String),
}

/// The instant a clock counts toward, in seconds since the unix epoch.
///
/// Always finite; fractional seconds are kept so that the remaining time is
/// floored only once, at decomposition.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Epoch(f64);

impl Epoch {
    /// Returns the epoch as seconds since the unix epoch.
    pub const fn seconds(&self) -> f64 {
        self.0
    }

    /// Signed seconds remaining until this epoch as seen from `now`.
    ///
    /// Negative once the epoch has passed.
    pub fn delta(&self, now: f64) -> f64 {
        self.0 - now
    }
}

impl TryFrom<f64> for Epoch {
    type Error = ClockError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        if seconds.is_finite() {
            Ok(Self(seconds))
        } else {
            Err(ClockError::InvalidArgument(format!("expected unix timestamp, got {seconds}")))
        }
    }
}

impl From<i64> for Epoch {
    fn from(seconds: i64) -> Self {
        Self(seconds as f64)
    }
}

impl From<DateTime<Utc>> for Epoch {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant.timestamp_millis() as f64 / 1000.0)
    }
}

impl FromStr for Epoch {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(seconds) = s.parse::<f64>() {
            return Self::try_from(seconds);
        }
        DateTime::parse_from_rfc3339(s)
            .map(|instant| Self::from(instant.with_timezone(&Utc)))
            .map_err(|_| ClockError::InvalidArgument(format!("expected unix timestamp, got {s:?}")))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything a clock can be pointed at.
///
/// Converted into an [`Epoch`] at construction, which is where invalid
/// targets are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Seconds since the unix epoch.
    Seconds(f64),
    /// A calendar instant.
    Instant(DateTime<Utc>),
    /// Epoch seconds or an RFC 3339 date-time, as text.
    Text(String),
}

impl From<f64> for Target {
    fn from(seconds: f64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<i64> for Target {
    fn from(seconds: i64) -> Self {
        Self::Seconds(seconds as f64)
    }
}

impl From<DateTime<Utc>> for Target {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl From<&str> for Target {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Target {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Epoch> for Target {
    fn from(epoch: Epoch) -> Self {
        Self::Seconds(epoch.0)
    }
}

impl TryFrom<Target> for Epoch {
    type Error = ClockError;

    fn try_from(target: Target) -> Result<Self, Self::Error> {
        match target {
            Target::Seconds(seconds) => Self::try_from(seconds),
            Target::Instant(instant) => Ok(Self::from(instant)),
            Target::Text(text) => text.parse(),
        }
    }
}

/// One of the four displayed time units, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    /// Whole days.
    Days,
    /// Hours within the day.
    Hours,
    /// Minutes within the hour.
    Minutes,
    /// Seconds within the minute.
    Seconds,
}

impl Unit {
    /// All units in display order.
    pub const ALL: [Self; 4] = [Self::Days, Self::Hours, Self::Minutes, Self::Seconds];

    /// Seconds represented by one step of this unit.
    pub const fn divisor(self) -> u64 {
        match self {
            Self::Days => SECONDS_PER_DAY,
            Self::Hours => SECONDS_PER_HOUR,
            Self::Minutes => SECONDS_PER_MINUTE,
            Self::Seconds => 1,
        }
    }

    /// Position of this unit in display order.
    pub const fn index(self) -> usize {
        match self {
            Self::Days => 0,
            Self::Hours => 1,
            Self::Minutes => 2,
            Self::Seconds => 3,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Days => "days",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
        };
        f.write_str(name)
    }
}

/// A span of whole seconds split into days, hours, minutes and seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnitValues {
    /// Whole days, unbounded.
    pub days: u64,
    /// Hours, `0..24`.
    pub hours: u64,
    /// Minutes, `0..60`.
    pub minutes: u64,
    /// Seconds, `0..60`.
    pub seconds: u64,
}

impl UnitValues {
    /// Decomposes a whole number of seconds.
    ///
    /// Divides by the largest unit first; each remainder feeds the next
    /// division.
    pub const fn decompose(total: u64) -> Self {
        let days = total / SECONDS_PER_DAY;
        let rest = total - days * SECONDS_PER_DAY;
        let hours = rest / SECONDS_PER_HOUR;
        let rest = rest - hours * SECONDS_PER_HOUR;
        let minutes = rest / SECONDS_PER_MINUTE;
        let seconds = rest - minutes * SECONDS_PER_MINUTE;
        Self { days, hours, minutes, seconds }
    }

    /// Decomposes a non-negative span of fractional seconds, flooring it.
    ///
    /// Negative and NaN spans count as zero.
    pub fn from_seconds(span: f64) -> Self {
        Self::decompose(span.max(0.0).floor() as u64)
    }

    /// Recombines the values into whole seconds.
    pub const fn total(&self) -> u64 {
        self.days * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }

    /// Returns the value of a single unit.
    pub const fn get(&self, unit: Unit) -> u64 {
        match unit {
            Unit::Days => self.days,
            Unit::Hours => self.hours,
            Unit::Minutes => self.minutes,
            Unit::Seconds => self.seconds,
        }
    }

    /// Iterates units and their values, most significant first.
    pub fn iter(&self) -> impl Iterator<Item = (Unit, u64)> + '_ {
        Unit::ALL.into_iter().map(|unit| (unit, self.get(unit)))
    }
}

impl fmt::Display for UnitValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {:02}:{:02}:{:02}", self.days, self.hours, self.minutes, self.seconds)
    }
}

/// Whether the clock shows time remaining or time elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Show the time remaining until the epoch.
    #[default]
    Down,
    /// Show the time elapsed since the epoch.
    Up,
}

/// Where group headings are placed relative to the rotors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingPosition {
    /// Above the rotors.
    #[default]
    Top,
    /// Below the rotors.
    Bottom,
}

/// Which unit groups are displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitsMode {
    /// Hide leading all-zero groups, from days downward.
    #[default]
    Auto,
    /// Always show every group.
    All,
}

/// One of the four text faces of a rotor.
///
/// While idle all four show the same glyph. During a flip the static
/// faces already show the incoming (front) and outgoing (rear) glyph while
/// the leaf overlay turns from the outgoing glyph on its top side to the
/// incoming glyph on its bottom side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Static face showing the incoming glyph.
    FrontStatic,
    /// Static face showing the outgoing glyph until the flip settles.
    RearStatic,
    /// Moving leaf side that starts at the outgoing glyph.
    TopLeaf,
    /// Moving leaf side that ends at the incoming glyph.
    BottomLeaf,
}

impl Face {
    /// All faces, in surface slot order.
    pub const ALL: [Self; 4] = [Self::FrontStatic, Self::RearStatic, Self::TopLeaf, Self::BottomLeaf];

    /// Position of this face in [`Face::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::FrontStatic => 0,
            Self::RearStatic => 1,
            Self::TopLeaf => 2,
            Self::BottomLeaf => 3,
        }
    }
}

/// Address of a single rotor.
///
/// `place` counts from the least significant digit, so addresses stay
/// stable when a group grows to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitAddr {
    /// The group the rotor belongs to.
    pub unit: Unit,
    /// Decimal place of the rotor, 0 being the ones digit.
    pub place: usize,
}

impl DigitAddr {
    /// Creates a new digit address.
    pub const fn new(unit: Unit, place: usize) -> Self {
        Self { unit, place }
    }
}

impl fmt::Display for DigitAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.unit, self.place)
    }
}

/// A labeled position on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The rotor group of a unit.
    Group(Unit),
    /// The delimiter drawn before a unit's group.
    Delimiter(Unit),
}

/// Outcome of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// The sampled wall-clock time, in epoch seconds.
    pub now: f64,
    /// Signed seconds until the epoch, before any clamping.
    pub remaining: f64,
    /// The values pushed to the rotor groups.
    pub values: UnitValues,
    /// Whether this tick moved the clock into the ended state.
    pub ended_now: bool,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::zero(0, UnitValues { days: 0, hours: 0, minutes: 0, seconds: 0 })]
    #[case::one_minute(60, UnitValues { days: 0, hours: 0, minutes: 1, seconds: 0 })]
    #[case::day_and_hour(90_000, UnitValues { days: 1, hours: 1, minutes: 0, seconds: 0 })]
    #[case::all_units(93_784, UnitValues { days: 1, hours: 2, minutes: 3, seconds: 4 })]
    #[case::just_under_day(86_399, UnitValues { days: 0, hours: 23, minutes: 59, seconds: 59 })]
    #[case::many_days(1234 * 86_400 + 1, UnitValues { days: 1234, hours: 0, minutes: 0, seconds: 1 })]
    fn decompose_known_spans(#[case] total: u64, #[case] expected: UnitValues) {
        assert_eq!(UnitValues::decompose(total), expected);
    }

    #[test]
    fn decompose_recombines_and_stays_in_range() {
        let spans = (0..200_000u64).step_by(997).chain([u64::MAX / 2, 86_400 * 365 * 10 + 7]);
        for total in spans {
            let values = UnitValues::decompose(total);
            assert_eq!(values.total(), total);
            assert!(values.hours < 24, "hours out of range for {total}");
            assert!(values.minutes < 60, "minutes out of range for {total}");
            assert!(values.seconds < 60, "seconds out of range for {total}");
        }
    }

    #[rstest]
    #[case::fraction(1.999, 1)]
    #[case::negative(-5.0, 0)]
    #[case::nan(f64::NAN, 0)]
    fn from_seconds_floors(#[case] span: f64, #[case] expected: u64) {
        assert_eq!(UnitValues::from_seconds(span).total(), expected);
    }

    #[test]
    fn epoch_rejects_non_finite() {
        assert!(matches!(Epoch::try_from(f64::NAN), Err(ClockError::InvalidArgument(_))));
        assert!(matches!(Epoch::try_from(f64::INFINITY), Err(ClockError::InvalidArgument(_))));
        assert_eq!(Epoch::try_from(12.5).unwrap().seconds(), 12.5);
    }

    #[rstest]
    #[case::integer("1700000000", 1_700_000_000.0)]
    #[case::fractional(" 1.5 ", 1.5)]
    #[case::rfc3339("2023-11-14T22:13:20Z", 1_700_000_000.0)]
    #[case::offset("2023-11-15T00:13:20+02:00", 1_700_000_000.0)]
    fn epoch_parses_text(#[case] text: &str, #[case] expected: f64) {
        let epoch: Epoch = text.parse().unwrap();
        assert_eq!(epoch.seconds(), expected);
    }

    #[rstest]
    #[case::garbage("tomorrow")]
    #[case::empty("")]
    #[case::infinite("inf")]
    fn epoch_rejects_bad_text(#[case] text: &str) {
        assert!(matches!(text.parse::<Epoch>(), Err(ClockError::InvalidArgument(_))));
    }

    #[test]
    fn target_conversions() {
        let instant = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(Epoch::try_from(Target::from(instant)).unwrap().seconds(), 1_700_000_000.0);
        assert_eq!(Epoch::try_from(Target::from(42i64)).unwrap().seconds(), 42.0);
        assert!(Epoch::try_from(Target::from("not a time")).is_err());
    }

    #[test]
    fn epoch_delta_sign() {
        let epoch = Epoch::from(100);
        assert_eq!(epoch.delta(98.0), 2.0);
        assert_eq!(epoch.delta(101.0), -1.0);
    }

    #[test]
    fn clock_error_display() {
        let err = ClockError::MissingMount("flipdown".to_string());
        assert_eq!(format!("{err}"), "render surface anchor not found: flipdown");
    }

    #[test]
    fn unit_values_display() {
        let values = UnitValues::decompose(93_784);
        assert_eq!(values.to_string(), "1d 02:03:04");
    }
}
