//! Provider implementations of the clock's collaborator traits.
//!
//! - [`WallTime`] and [`ManualTime`] implement [`TimeSource`]
//! - [`MemorySurface`] implements [`RenderSurface`] over a shared snapshot
//! - [`MemoryMount`] resolves named anchors to memory surfaces

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use chrono::Utc;

use crate::{
    traits::{Mount, RenderSurface, TimeSource},
    types::{DigitAddr, Face, HeadingPosition, Slot, Unit},
};

/// Wall-clock time with millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallTime;

impl TimeSource for WallTime {
    fn now(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// A time source that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    /// Current time as `f64` bits.
    bits: Arc<AtomicU64>,
}

impl ManualTime {
    /// Creates a source frozen at `now` epoch seconds.
    pub fn new(now: f64) -> Self {
        Self { bits: Arc::new(AtomicU64::new(now.to_bits())) }
    }

    /// Creates a source frozen at the current wall-clock time.
    pub fn from_wall() -> Self {
        Self::new(WallTime.now())
    }

    /// Jumps to `now` epoch seconds.
    pub fn set(&self, now: f64) {
        self.bits.store(now.to_bits(), Ordering::SeqCst);
    }

    /// Moves time by `seconds`, which may be negative.
    pub fn advance(&self, seconds: f64) {
        let _ = self.bits.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
            Some((f64::from_bits(bits) + seconds).to_bits())
        });
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// The four faces and flip state of one rotor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotorView {
    /// Face texts, indexed by [`Face::index`].
    pub faces: [String; 4],
    /// Whether the flip toggle is on.
    pub flipping: bool,
    /// When the flip toggle was last turned on.
    pub flip_started: Option<Instant>,
}

impl RotorView {
    /// Returns the text of one face.
    pub fn face(&self, face: Face) -> &str {
        &self.faces[face.index()]
    }
}

/// Everything a surface knows about one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    /// Rotors, least significant first.
    pub rotors: Vec<RotorView>,
    /// Heading text.
    pub label: Option<String>,
    /// Delimiter glyph drawn before the group.
    pub delimiter: Option<String>,
    /// Heading placement.
    pub position: HeadingPosition,
    /// Whether the group is shown.
    pub visible: bool,
}

impl Default for GroupView {
    fn default() -> Self {
        Self {
            rotors: Vec::new(),
            label: None,
            delimiter: None,
            position: HeadingPosition::default(),
            visible: true,
        }
    }
}

impl GroupView {
    /// Returns the front glyphs, most significant first.
    pub fn text(&self) -> String {
        self.rotors.iter().rev().map(|rotor| rotor.face(Face::FrontStatic)).collect()
    }

    /// Returns whether any rotor is mid-flip.
    pub fn is_flipping(&self) -> bool {
        self.rotors.iter().any(|rotor| rotor.flipping)
    }
}

/// A snapshot of a [`MemorySurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceView {
    /// Groups in display order.
    pub groups: [GroupView; 4],
    /// Applied theme.
    pub theme: String,
    /// Whether the countdown has ended.
    pub ended: bool,
    /// Whether the clock is stopped.
    pub stopped: bool,
    /// Number of flips started on this surface.
    pub flips: u64,
}

impl SurfaceView {
    /// Returns the view of one group.
    pub const fn group(&self, unit: Unit) -> &GroupView {
        &self.groups[unit.index()]
    }

    /// Renders the visible groups on one line, e.g. `02 Days : 01 Hours`.
    pub fn render_line(&self) -> String {
        let mut parts = Vec::new();
        for group in self.groups.iter().filter(|group| group.visible) {
            if let Some(delimiter) = group.delimiter.as_deref().filter(|glyph| !glyph.is_empty()) {
                if !parts.is_empty() {
                    parts.push(delimiter.to_string());
                }
            }
            match &group.label {
                Some(label) => parts.push(format!("{} {label}", group.text())),
                None => parts.push(group.text()),
            }
        }
        parts.join(" ")
    }
}

/// A render surface that records everything into a shared snapshot.
///
/// Clones share the same state, so one handle can be given to a clock while
/// another is read by a UI or a test.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    state: Arc<Mutex<SurfaceView>>,
}

impl MemorySurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> SurfaceView {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceView> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_rotor(&self, at: DigitAddr, f: impl FnOnce(&mut RotorView)) {
        let mut state = self.lock();
        let rotors = &mut state.groups[at.unit.index()].rotors;
        if rotors.len() <= at.place {
            rotors.resize_with(at.place + 1, RotorView::default);
        }
        f(&mut rotors[at.place]);
    }
}

impl RenderSurface for MemorySurface {
    fn set_face(&mut self, at: DigitAddr, face: Face, text: &str) {
        self.with_rotor(at, |rotor| rotor.faces[face.index()] = text.to_string());
    }

    fn set_flipping(&mut self, at: DigitAddr, active: bool) {
        self.with_rotor(at, |rotor| {
            rotor.flipping = active;
            if active {
                rotor.flip_started = Some(Instant::now());
            }
        });
        if active {
            self.lock().flips += 1;
        }
    }

    fn set_rotor_count(&mut self, unit: Unit, count: usize) {
        let mut state = self.lock();
        let rotors = &mut state.groups[unit.index()].rotors;
        if rotors.len() < count {
            rotors.resize_with(count, RotorView::default);
        }
    }

    fn set_label(&mut self, slot: Slot, label: Option<&str>, position: HeadingPosition) {
        let mut state = self.lock();
        match slot {
            Slot::Group(unit) => {
                let group = &mut state.groups[unit.index()];
                group.label = label.map(str::to_string);
                group.position = position;
            }
            Slot::Delimiter(unit) => {
                state.groups[unit.index()].delimiter = label.map(str::to_string);
            }
        }
    }

    fn set_visible(&mut self, unit: Unit, visible: bool) {
        self.lock().groups[unit.index()].visible = visible;
    }

    fn set_theme(&mut self, theme: &str) {
        self.lock().theme = theme.to_string();
    }

    fn set_ended(&mut self, ended: bool) {
        self.lock().ended = ended;
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.lock().stopped = stopped;
    }
}

/// A set of named memory surfaces.
#[derive(Debug, Clone, Default)]
pub struct MemoryMount {
    anchors: HashMap<String, MemorySurface>,
}

impl MemoryMount {
    /// Creates a mount with no anchors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an anchor, returning a handle to its surface.
    pub fn insert(&mut self, anchor: impl Into<String>) -> MemorySurface {
        self.anchors.entry(anchor.into()).or_default().clone()
    }

    /// Returns the surface of an anchor.
    pub fn get(&self, anchor: &str) -> Option<&MemorySurface> {
        self.anchors.get(anchor)
    }
}

impl Mount for MemoryMount {
    type Surface = MemorySurface;

    fn attach(&self, anchor: &str) -> Option<Self::Surface> {
        self.anchors.get(anchor).cloned()
    }
}
