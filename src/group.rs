//! Rotor groups and the labeled slots around them.
//!
//! A [`RotorGroup`] shows one time unit across an ordered row of
//! [`RotorDigit`]s. A [`Delimiter`] is the glyph drawn in front of a group.
//! Both paint an optional label into their slot through [`LabeledSlot`].

use tracing::debug;

use crate::{
    digit::{Flip, RotorDigit},
    traits::RenderSurface,
    types::{DigitAddr, HeadingPosition, Slot, Unit},
};

/// Minimum number of rotors in a group.
pub const DEFAULT_ROTORS: usize = 2;

/// Something occupying a slot that may carry a label.
pub trait LabeledSlot {
    /// The slot this item occupies.
    fn slot(&self) -> Slot;

    /// The label to show, if any.
    fn label(&self) -> Option<&str>;

    /// Where the label sits relative to the slot.
    fn label_position(&self) -> HeadingPosition;

    /// Paints the label onto a surface.
    fn paint_label<S: RenderSurface>(&self, surface: &mut S) {
        surface.set_label(self.slot(), self.label(), self.label_position());
    }
}

/// A group heading such as "Days".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// The heading text.
    pub text: String,
    /// Placement relative to the rotors.
    pub position: HeadingPosition,
}

impl Heading {
    /// Creates a new heading.
    pub fn new(text: impl Into<String>, position: HeadingPosition) -> Self {
        Self { text: text.into(), position }
    }
}

/// A separator glyph drawn before a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    /// The group this delimiter precedes.
    unit: Unit,
    /// The glyph to draw.
    glyph: String,
    /// Placement, shared with the group headings.
    position: HeadingPosition,
}

impl Delimiter {
    /// Creates a delimiter in front of `unit`'s group.
    pub fn new(unit: Unit, glyph: impl Into<String>, position: HeadingPosition) -> Self {
        Self { unit, glyph: glyph.into(), position }
    }

    /// Returns the glyph.
    pub fn glyph(&self) -> &str {
        &self.glyph
    }
}

impl LabeledSlot for Delimiter {
    fn slot(&self) -> Slot {
        Slot::Delimiter(self.unit)
    }

    fn label(&self) -> Option<&str> {
        Some(&self.glyph)
    }

    fn label_position(&self) -> HeadingPosition {
        self.position
    }
}

/// The rotors showing one time unit.
///
/// Rotors are stored by place value (index 0 is the ones digit). When a
/// value is wider than the group, the group grows to fit: new rotors are
/// added on the left and never removed, so a day count of 1234 in a two
/// rotor group becomes four rotors showing `1`, `2`, `3`, `4`.
#[derive(Debug, Clone)]
pub struct RotorGroup {
    /// The unit this group shows.
    unit: Unit,
    /// Rotors, least significant first.
    rotors: Vec<RotorDigit>,
    /// The value most recently assigned.
    value: Option<u64>,
    /// Optional heading.
    heading: Option<Heading>,
    /// Optional delimiter in front of the group.
    delimiter: Option<Delimiter>,
    /// Whether the group is shown.
    visible: bool,
}

impl RotorGroup {
    /// Creates a group with `rotors` digit slots (at least one).
    pub fn new(
        unit: Unit,
        rotors: usize,
        heading: Option<Heading>,
        delimiter: Option<Delimiter>,
    ) -> Self {
        let rotors = (0..rotors.max(1)).map(|_| RotorDigit::new()).collect();
        Self { unit, rotors, value: None, heading, delimiter, visible: true }
    }

    /// Announces the group's layout to a surface.
    pub fn mount<S: RenderSurface>(&self, surface: &mut S) {
        surface.set_rotor_count(self.unit, self.rotors.len());
        self.paint_label(surface);
        if let Some(delimiter) = &self.delimiter {
            delimiter.paint_label(surface);
        }
    }

    /// Returns the unit this group shows.
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns the number of rotors.
    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    /// Returns whether the group has no rotors. Never true in practice.
    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    /// Returns the value most recently assigned.
    pub const fn value(&self) -> Option<u64> {
        self.value
    }

    /// Returns a rotor by place value.
    pub fn rotor(&self, place: usize) -> Option<&RotorDigit> {
        self.rotors.get(place)
    }

    /// Returns the heading, if any.
    pub const fn heading(&self) -> Option<&Heading> {
        self.heading.as_ref()
    }

    /// Returns the delimiter, if any.
    pub const fn delimiter(&self) -> Option<&Delimiter> {
        self.delimiter.as_ref()
    }

    /// Returns whether the group is shown.
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the group.
    pub fn set_visible<S: RenderSurface>(&mut self, visible: bool, surface: &mut S) {
        self.visible = visible;
        surface.set_visible(self.unit, visible);
    }

    /// Returns the glyphs shown, most significant first.
    pub fn text(&self) -> String {
        self.rotors.iter().rev().filter_map(RotorDigit::shown).collect()
    }

    /// Assigns a new value, returning the flips this started.
    ///
    /// The value is zero padded to the group's width; if it is wider, the
    /// group first grows by as many rotors as needed.
    pub fn set_value<S: RenderSurface>(&mut self, value: u64, surface: &mut S) -> Vec<Flip> {
        let text = format!("{value:0width$}", width = self.rotors.len());
        let width = text.len();
        if width > self.rotors.len() {
            debug!(unit = %self.unit, from = self.rotors.len(), to = width, "rotor group grown");
            self.rotors.resize_with(width, RotorDigit::new);
            surface.set_rotor_count(self.unit, width);
        }
        self.value = Some(value);

        let unit = self.unit;
        self.rotors
            .iter_mut()
            .zip(text.char_indices().rev())
            .enumerate()
            .filter_map(|(place, (rotor, (start, ch)))| {
                let glyph = &text[start..start + ch.len_utf8()];
                rotor.set_text(glyph, DigitAddr::new(unit, place), surface)
            })
            .collect()
    }

    /// Settles a rotor's flip. See [`RotorDigit::settle`].
    pub fn settle<S: RenderSurface>(
        &mut self,
        place: usize,
        seq: Option<u64>,
        surface: &mut S,
    ) -> bool {
        let at = DigitAddr::new(self.unit, place);
        self.rotors.get_mut(place).is_some_and(|rotor| rotor.settle(seq, at, surface))
    }
}

impl LabeledSlot for RotorGroup {
    fn slot(&self) -> Slot {
        Slot::Group(self.unit)
    }

    fn label(&self) -> Option<&str> {
        self.heading.as_ref().map(|heading| heading.text.as_str())
    }

    fn label_position(&self) -> HeadingPosition {
        self.heading.as_ref().map(|heading| heading.position).unwrap_or_default()
    }
}
