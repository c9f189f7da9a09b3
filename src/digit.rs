//! Single rotor flip state machine.
//!
//! A [`RotorDigit`] remembers the glyph it last showed and drives the
//! two-phase flip of its surface faces when a different glyph arrives.

use tracing::trace;

use crate::{
    traits::RenderSurface,
    types::{DigitAddr, Face},
};

/// Phase of a rotor's flip transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlipPhase {
    /// No transition pending; all faces show the same glyph.
    #[default]
    Idle,
    /// A transition is in progress.
    Flipping {
        /// Identifies this transition among the rotor's flips.
        seq: u64,
        /// The glyph being flipped away from.
        from: String,
    },
}

/// Handle for a flip that was started and still has to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flip {
    /// The rotor that is flipping.
    pub at: DigitAddr,
    /// Sequence number of the transition on that rotor.
    pub seq: u64,
}

/// One flip display slot.
///
/// Any single glyph may be shown; nothing here checks that it is a digit.
#[derive(Debug, Clone, Default)]
pub struct RotorDigit {
    /// The glyph most recently assigned, `None` before the first paint.
    shown: Option<String>,
    /// Current transition phase.
    phase: FlipPhase,
    /// Sequence number of the latest flip.
    seq: u64,
    /// Number of flips started over the rotor's lifetime.
    flips: u64,
}

impl RotorDigit {
    /// Creates a rotor that has not been painted yet.
    pub const fn new() -> Self {
        Self { shown: None, phase: FlipPhase::Idle, seq: 0, flips: 0 }
    }

    /// Returns the glyph most recently assigned.
    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    /// Returns the current transition phase.
    pub const fn phase(&self) -> &FlipPhase {
        &self.phase
    }

    /// Returns whether a flip is in progress.
    pub const fn is_flipping(&self) -> bool {
        matches!(self.phase, FlipPhase::Flipping { .. })
    }

    /// Returns the number of flips started so far.
    pub const fn flips_started(&self) -> u64 {
        self.flips
    }

    /// Assigns a new glyph.
    ///
    /// Assigning the glyph already shown does nothing, so an unchanged
    /// digit never restarts its animation. The first assignment paints all
    /// faces directly. Any later change starts a flip from the glyph last
    /// assigned, superseding a flip still in progress, and returns a
    /// [`Flip`] that must eventually be passed to [`RotorDigit::settle`].
    pub fn set_text<S: RenderSurface>(
        &mut self,
        text: &str,
        at: DigitAddr,
        surface: &mut S,
    ) -> Option<Flip> {
        let Some(previous) = self.shown.as_deref() else {
            paint_all(surface, at, text);
            self.shown = Some(text.to_string());
            return None;
        };
        if previous == text {
            return None;
        }

        let previous = previous.to_string();
        surface.set_face(at, Face::FrontStatic, text);
        surface.set_face(at, Face::RearStatic, &previous);
        surface.set_face(at, Face::TopLeaf, &previous);
        surface.set_face(at, Face::BottomLeaf, text);
        surface.set_flipping(at, true);

        self.seq += 1;
        self.flips += 1;
        trace!(%at, from = %previous, to = text, seq = self.seq, "rotor flip started");
        self.phase = FlipPhase::Flipping { seq: self.seq, from: previous };
        self.shown = Some(text.to_string());

        Some(Flip { at, seq: self.seq })
    }

    /// Settles a flip, leaving every face on the assigned glyph.
    ///
    /// With `Some(seq)` only the matching flip settles, so a late timer
    /// from a superseded flip is ignored. With `None` whatever flip is in
    /// progress settles. Returns whether anything changed; settling an idle
    /// rotor is a no-op.
    pub fn settle<S: RenderSurface>(
        &mut self,
        seq: Option<u64>,
        at: DigitAddr,
        surface: &mut S,
    ) -> bool {
        let FlipPhase::Flipping { seq: current, .. } = self.phase else {
            return false;
        };
        if seq.is_some_and(|seq| seq != current) {
            return false;
        }

        if let Some(text) = self.shown.as_deref() {
            paint_all(surface, at, text);
        }
        surface.set_flipping(at, false);
        self.phase = FlipPhase::Idle;
        trace!(%at, seq = current, "rotor flip settled");
        true
    }
}

fn paint_all<S: RenderSurface>(surface: &mut S, at: DigitAddr, text: &str) {
    for face in Face::ALL {
        surface.set_face(at, face, text);
    }
}
