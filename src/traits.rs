//! Trait abstractions for the clock's collaborators.
//!
//! The clock itself only computes values and drives rotor state machines.
//! Everything it talks to is behind one of these traits:
//!
//! - [`TimeSource`]: where the current time is sampled from
//! - [`RenderSurface`]: what turns rotor state into visible glyphs
//! - [`Mount`]: how a named anchor is resolved into a surface

use crate::types::{DigitAddr, Face, HeadingPosition, Slot, Unit};

/// Source of wall-clock time, in seconds since the unix epoch.
///
/// Sampled once per tick. Implementations for deterministic tests can
/// return any value; the clock never assumes time moves forward.
///
/// # Example
///
/// ```
/// use flipdown::TimeSource;
///
/// #[derive(Debug)]
/// struct Frozen(f64);
///
/// impl TimeSource for Frozen {
///     fn now(&self) -> f64 {
///         self.0
///     }
/// }
///
/// assert_eq!(Frozen(12.5).now(), 12.5);
/// ```
pub trait TimeSource: Send + Sync + 'static {
    /// Returns the current time in (fractional) epoch seconds.
    fn now(&self) -> f64;
}

/// A surface that renders the rotors of one clock.
///
/// Every rotor exposes four independently settable faces (see [`Face`])
/// and a flip toggle. The clock sets the toggle when a digit starts to
/// change and clears it when the flip settles. Surfaces that animate on
/// their own can report the end of an animation back to the clock through
/// [`Clock::settle_sender`](crate::Clock::settle_sender).
///
/// Only the rotor methods are required; labels, visibility, theme and the
/// ended and stopped states default to no-ops.
pub trait RenderSurface: Send + 'static {
    /// Sets the text of one face of a rotor.
    fn set_face(&mut self, at: DigitAddr, face: Face, text: &str);

    /// Turns the flip animation of a rotor on or off.
    fn set_flipping(&mut self, at: DigitAddr, active: bool);

    /// Sets the number of rotors in a group.
    ///
    /// Called once per group when the clock initialises and again whenever
    /// a group grows. Rotors are addressed by place value, so new rotors
    /// appear on the left.
    fn set_rotor_count(&mut self, unit: Unit, count: usize);

    /// Sets or clears the label shown in a slot.
    fn set_label(&mut self, slot: Slot, label: Option<&str>, position: HeadingPosition) {
        let _ = (slot, label, position);
    }

    /// Shows or hides a whole group and its delimiter.
    fn set_visible(&mut self, unit: Unit, visible: bool) {
        let _ = (unit, visible);
    }

    /// Applies a theme by name.
    fn set_theme(&mut self, theme: &str) {
        let _ = theme;
    }

    /// Marks the countdown as ended.
    fn set_ended(&mut self, ended: bool) {
        let _ = ended;
    }

    /// Marks the clock as stopped or running.
    fn set_stopped(&mut self, stopped: bool) {
        let _ = stopped;
    }
}

/// Resolves a named anchor into a render surface.
///
/// This is the clock's equivalent of looking up a mount point by id. A
/// mount that cannot find the anchor returns `None`, which makes
/// [`Clock::mount`](crate::Clock::mount) fail with
/// [`ClockError::MissingMount`](crate::ClockError::MissingMount).
pub trait Mount {
    /// The surface type produced by this mount.
    type Surface: RenderSurface;

    /// Attaches to the anchor with the given name.
    fn attach(&self, anchor: &str) -> Option<Self::Surface>;
}
