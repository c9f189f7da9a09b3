//! Countdown clock controller.
//!
//! The [`Clock`] is the main entry point of flipdown. It samples the time
//! once per tick, splits the remaining (or elapsed) seconds into days,
//! hours, minutes and seconds, pushes them into its rotor groups and fires
//! the caller's callbacks.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at, sleep},
};
use tracing::{debug, info, trace, warn};

use crate::{
    config::{ClockOptions, SettleMode},
    digit::Flip,
    group::{DEFAULT_ROTORS, Delimiter, Heading, RotorGroup},
    providers::WallTime,
    traits::{Mount, RenderSurface, TimeSource},
    types::{
        ClockError, DigitAddr, DigitsMode, Direction, Epoch, SECONDS_PER_DAY, Target, TickReport,
        Unit, UnitValues,
    },
};

/// Interval between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Day counts below this get the default two rotors.
const WIDE_DAYS: f64 = 100.0;

/// One-shot end callback registered through [`Clock::if_ended`].
type OneShot = Box<dyn FnOnce() + Send>;

/// Sender half of the flip completion channel.
pub type SettleSender = mpsc::UnboundedSender<DigitAddr>;

type SettleReceiver = mpsc::UnboundedReceiver<DigitAddr>;

/// Seconds to display for a signed `remaining`, per direction and clamp.
fn display_span(direction: Direction, stop_at_end: bool, remaining: f64) -> f64 {
    match direction {
        Direction::Down if remaining > 0.0 => remaining,
        Direction::Down if stop_at_end => 0.0,
        Direction::Down => -remaining,
        Direction::Up => (-remaining).max(0.0),
    }
}

/// Rotor count of the day group when the clock initialises.
fn day_rotors(remaining: f64) -> usize {
    let days = (remaining / SECONDS_PER_DAY as f64).floor();
    if days < WIDE_DAYS { DEFAULT_ROTORS } else { (days as u64).to_string().len() }
}

/// Mutable state of a clock, guarded by one lock.
struct ClockState<S> {
    /// The instant counted toward.
    epoch: Epoch,
    /// Time sampled at the latest tick.
    now: f64,
    /// Options, including the current theme.
    options: ClockOptions,
    /// Rotor groups in unit order, empty until initialised.
    groups: Vec<RotorGroup>,
    /// Where the rotors are drawn.
    surface: S,
    /// Whether the groups have been built.
    initialised: bool,
    /// Whether the countdown has ended. Never reset.
    ended: bool,
    /// Pending one-shot end callback.
    if_ended: Option<OneShot>,
}

/// Everything a tick decided while holding the lock.
struct Advance {
    report: TickReport,
    flips: Vec<Flip>,
    fire_ended: bool,
    one_shot: Option<OneShot>,
}

impl<S: RenderSurface> ClockState<S> {
    fn initialise(&mut self, remaining: f64) {
        let options = &self.options;
        let position = options.headings_at;
        self.groups = Unit::ALL
            .into_iter()
            .map(|unit| {
                let rotors = options.rotor.unwrap_or(match unit {
                    Unit::Days => day_rotors(remaining),
                    _ => DEFAULT_ROTORS,
                });
                let heading = options
                    .headings
                    .as_ref()
                    .map(|labels| &labels[unit.index()])
                    .filter(|label| !label.is_empty())
                    .map(|label| Heading::new(label.as_str(), position));
                let delimiter = options
                    .delimiters
                    .as_ref()
                    .map(|glyphs| &glyphs[unit.index()])
                    .filter(|glyph| !glyph.is_empty())
                    .map(|glyph| Delimiter::new(unit, glyph.as_str(), position));
                RotorGroup::new(unit, rotors, heading, delimiter)
            })
            .collect();
        for group in &self.groups {
            group.mount(&mut self.surface);
        }
        self.initialised = true;
    }

    // Leading zero groups are only hidden once, right after the first
    // values land. Seconds always stay visible.
    fn hide_leading_zeros(&mut self) {
        if self.options.digits != DigitsMode::Auto {
            return;
        }
        let last = self.groups.len().saturating_sub(1);
        for group in self.groups.iter_mut().take(last) {
            if group.value() != Some(0) {
                break;
            }
            debug!(unit = %group.unit(), "hiding leading zero group");
            group.set_visible(false, &mut self.surface);
        }
    }

    // Counting up or overtime, hidden groups pick up non-zero values. Such
    // a group is shown again along with every less significant group.
    fn reveal_grown(&mut self) {
        let Some(start) =
            self.groups.iter().position(|group| !group.is_visible() && group.value() != Some(0))
        else {
            return;
        };
        for group in self.groups.iter_mut().skip(start).filter(|group| !group.is_visible()) {
            debug!(unit = %group.unit(), "revealing grown group");
            group.set_visible(true, &mut self.surface);
        }
    }

    fn advance(&mut self, now: f64) -> Advance {
        self.now = now;
        let remaining = self.epoch.delta(now);
        let span = display_span(self.options.direction, self.options.stop_at_end, remaining);
        let values = UnitValues::from_seconds(span);

        let first = !self.initialised;
        if first {
            self.initialise(remaining);
        }
        let mut flips = Vec::new();
        for (group, (_, value)) in self.groups.iter_mut().zip(values.iter()) {
            flips.extend(group.set_value(value, &mut self.surface));
        }
        if first {
            self.hide_leading_zeros();
        } else {
            self.reveal_grown();
        }

        let ended_now = remaining < 0.0 && !self.ended;
        if ended_now {
            self.ended = true;
            self.surface.set_ended(true);
        }
        let one_shot = if self.ended { self.if_ended.take() } else { None };

        trace!(now, remaining, %values, flips = flips.len(), "tick");
        Advance {
            report: TickReport { now, remaining, values, ended_now },
            flips,
            fire_ended: ended_now,
            one_shot,
        }
    }

    fn settle(&mut self, at: DigitAddr, seq: Option<u64>) -> bool {
        match self.groups.get_mut(at.unit.index()) {
            Some(group) => group.settle(at.place, seq, &mut self.surface),
            None => false,
        }
    }
}

/// Handle to the periodic tick task.
struct Runner {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// State shared between clock handles and the tick task.
struct Shared<T, S> {
    time: T,
    state: Mutex<ClockState<S>>,
    runner: Mutex<Option<Runner>>,
    settle_tx: SettleSender,
    settle_rx: Mutex<Option<SettleReceiver>>,
    callback_failures: AtomicU64,
}

/// A flip countdown clock.
///
/// The clock owns four [`RotorGroup`]s (days, hours, minutes, seconds) and
/// drives them from a [`TimeSource`] onto a [`RenderSurface`]. Cloning a
/// clock yields another handle to the same clock.
///
/// # Type Parameters
///
/// * `T` - Where the time is sampled from, must implement [`TimeSource`]
/// * `S` - Where the rotors are drawn, must implement [`RenderSurface`]
///
/// # Example
///
/// ```no_run
/// use flipdown::{Clock, ClockOptions, MemorySurface};
///
/// # async fn run() -> Result<(), flipdown::ClockError> {
/// let surface = MemorySurface::new();
/// let clock = Clock::new("2030-01-01T00:00:00Z", surface.clone(), ClockOptions::default())?;
///
/// clock.start().await.if_ended(|| println!("The countdown has ended!")).await;
///
/// println!("{}", surface.snapshot().render_line());
/// # Ok(())
/// # }
/// ```
pub struct Clock<T, S> {
    shared: Arc<Shared<T, S>>,
}

impl<T, S> Clone for Clock<T, S> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T, S> std::fmt::Debug for Clock<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("callback_failures", &self.shared.callback_failures.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<S: RenderSurface> Clock<WallTime, S> {
    /// Creates a clock on wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidArgument`] if the target is not a valid
    /// instant.
    pub fn new(
        target: impl Into<Target>,
        surface: S,
        options: ClockOptions,
    ) -> Result<Self, ClockError> {
        Self::with_time(target, surface, options, WallTime)
    }

    /// Creates a clock on wall-clock time, drawing on a mounted anchor.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidArgument`] if the target is not a valid
    /// instant and [`ClockError::MissingMount`] if the anchor is unknown.
    pub fn mount<M>(
        target: impl Into<Target>,
        mount: &M,
        anchor: &str,
        options: ClockOptions,
    ) -> Result<Self, ClockError>
    where
        M: Mount<Surface = S>,
    {
        Self::mount_with_time(target, mount, anchor, options, WallTime)
    }
}

impl<T: TimeSource, S: RenderSurface> Clock<T, S> {
    /// Creates a clock on a custom time source.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidArgument`] if the target is not a valid
    /// instant.
    pub fn with_time(
        target: impl Into<Target>,
        mut surface: S,
        options: ClockOptions,
        time: T,
    ) -> Result<Self, ClockError> {
        let epoch = Epoch::try_from(target.into())?;
        let now = time.now();
        surface.set_theme(&options.theme);
        info!(version = Self::version(), theme = %options.theme, %epoch, "flipdown clock created");

        let (settle_tx, settle_rx) = mpsc::unbounded_channel();
        let state = ClockState {
            epoch,
            now,
            options,
            groups: Vec::new(),
            surface,
            initialised: false,
            ended: false,
            if_ended: None,
        };
        Ok(Self {
            shared: Arc::new(Shared {
                time,
                state: Mutex::new(state),
                runner: Mutex::new(None),
                settle_tx,
                settle_rx: Mutex::new(Some(settle_rx)),
                callback_failures: AtomicU64::new(0),
            }),
        })
    }

    /// Creates a clock on a custom time source, drawing on a mounted anchor.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidArgument`] if the target is not a valid
    /// instant and [`ClockError::MissingMount`] if the anchor is unknown.
    pub fn mount_with_time<M>(
        target: impl Into<Target>,
        mount: &M,
        anchor: &str,
        options: ClockOptions,
        time: T,
    ) -> Result<Self, ClockError>
    where
        M: Mount<Surface = S>,
    {
        let target = target.into();
        Epoch::try_from(target.clone())?;
        let surface =
            mount.attach(anchor).ok_or_else(|| ClockError::MissingMount(anchor.to_string()))?;
        Self::with_time(target, surface, options, time)
    }

    /// Returns the library version.
    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Starts ticking.
    ///
    /// Ticks once right away, then every [`TICK_INTERVAL`]. Starting a
    /// running clock does nothing.
    pub async fn start(&self) -> &Self {
        let mut runner = self.shared.runner.lock().await;
        if runner.as_ref().is_some_and(|runner| !runner.handle.is_finished()) {
            debug!("clock already running");
            return self;
        }

        self.tick().await;
        self.shared.state.lock().await.surface.set_stopped(false);

        let settle_rx = self.shared.settle_rx.lock().await.take();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(Arc::downgrade(&self.shared), shutdown_rx, settle_rx));
        *runner = Some(Runner { shutdown, handle });

        info!("clock started");
        self
    }

    /// Stops ticking.
    ///
    /// The displayed values are kept. Stopping a stopped clock does nothing.
    pub async fn stop(&self) -> &Self {
        let Some(runner) = self.shared.runner.lock().await.take() else {
            debug!("clock already stopped");
            return self;
        };
        let _ = runner.shutdown.send(());
        if let Err(err) = runner.handle.await {
            warn!(%err, "clock runner failed");
        }

        self.shared.state.lock().await.surface.set_stopped(true);
        info!("clock stopped");
        self
    }

    /// Returns whether the clock is ticking.
    pub async fn is_running(&self) -> bool {
        self.shared.runner.lock().await.as_ref().is_some_and(|runner| !runner.handle.is_finished())
    }

    /// Runs one tick.
    ///
    /// Samples the time, updates every group from that single sample, calls
    /// the tick callback and evaluates the end of the countdown. Called by
    /// the tick task; may also be called directly.
    pub async fn tick(&self) -> TickReport {
        let now = self.shared.time.now();
        let (advance, settle, on_tick, on_ended) = {
            let mut state = self.shared.state.lock().await;
            let advance = state.advance(now);
            let options = &state.options;
            (advance, options.settle, options.on_tick.clone(), options.on_ended.clone())
        };
        let Advance { report, flips, fire_ended, one_shot } = advance;

        if let SettleMode::Timer(delay) = settle {
            self.settle_later(flips, delay);
        }

        if let Some(on_tick) = on_tick {
            self.guarded("tick", || on_tick(report.remaining, report.now));
        }
        if fire_ended {
            info!(now = report.now, "countdown ended");
            if let Some(on_ended) = on_ended {
                self.guarded("ended", || on_ended(report.now));
            }
        }
        if let Some(one_shot) = one_shot {
            self.guarded("if_ended", one_shot);
        }

        report
    }

    /// Registers a callback to run once the countdown has ended.
    ///
    /// The callback runs at most once, on the first tick at which the
    /// countdown is ended; if it already is, that is the next tick.
    /// Registering again replaces a callback that has not run yet.
    pub async fn if_ended(&self, callback: impl FnOnce() + Send + 'static) -> &Self {
        self.shared.state.lock().await.if_ended = Some(Box::new(callback));
        self
    }

    /// Applies a theme.
    pub async fn set_theme(&self, theme: impl Into<String>) -> &Self {
        let theme = theme.into();
        let mut state = self.shared.state.lock().await;
        state.surface.set_theme(&theme);
        state.options.theme = theme;
        self
    }

    /// Returns the current theme.
    pub async fn theme(&self) -> String {
        self.shared.state.lock().await.options.theme.clone()
    }

    /// Returns the target instant.
    pub async fn epoch(&self) -> Epoch {
        self.shared.state.lock().await.epoch
    }

    /// Returns the time sampled at the latest tick, or at construction.
    pub async fn now(&self) -> f64 {
        self.shared.state.lock().await.now
    }

    /// Returns whether the countdown has ended.
    pub async fn is_ended(&self) -> bool {
        self.shared.state.lock().await.ended
    }

    /// Returns the glyphs a group shows, empty before the first tick.
    pub async fn group_text(&self, unit: Unit) -> String {
        let state = self.shared.state.lock().await;
        state.groups.get(unit.index()).map(RotorGroup::text).unwrap_or_default()
    }

    /// Returns how many callbacks have panicked.
    pub fn callback_failures(&self) -> u64 {
        self.shared.callback_failures.load(Ordering::Relaxed)
    }

    /// Returns a sender for reporting finished flip animations.
    ///
    /// Used with [`SettleMode::Surface`]. Reports are handled by the tick
    /// task, so they queue up while the clock is stopped.
    pub fn settle_sender(&self) -> SettleSender {
        self.shared.settle_tx.clone()
    }

    /// Settles whatever flip is in progress on a rotor.
    ///
    /// Returns whether a flip was settled.
    pub async fn finish_flip(&self, at: DigitAddr) -> bool {
        self.shared.state.lock().await.settle(at, None)
    }

    fn settle_later(&self, flips: Vec<Flip>, delay: Duration) {
        if flips.is_empty() {
            return;
        }
        let shared = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            sleep(delay).await;
            let Some(shared) = shared.upgrade() else { return };
            let mut state = shared.state.lock().await;
            for flip in flips {
                state.settle(flip.at, Some(flip.seq));
            }
        });
    }

    fn guarded(&self, name: &'static str, callback: impl FnOnce()) {
        if catch_unwind(AssertUnwindSafe(callback)).is_err() {
            self.shared.callback_failures.fetch_add(1, Ordering::Relaxed);
            warn!(callback = name, "clock callback panicked");
        }
    }
}

/// Body of the tick task.
///
/// Holds the clock weakly, so dropping every handle ends the task.
async fn run<T: TimeSource, S: RenderSurface>(
    shared: Weak<Shared<T, S>>,
    mut shutdown: oneshot::Receiver<()>,
    mut settle_rx: Option<SettleReceiver>,
) {
    let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let Some(shared) = shared.upgrade() else { break };
                Clock { shared }.tick().await;
            }
            Some(at) = next_settle(&mut settle_rx) => {
                let Some(shared) = shared.upgrade() else { break };
                Clock { shared }.finish_flip(at).await;
            }
        }
    }

    if let (Some(rx), Some(shared)) = (settle_rx, shared.upgrade()) {
        *shared.settle_rx.lock().await = Some(rx);
    }
}

async fn next_settle(rx: &mut Option<SettleReceiver>) -> Option<DigitAddr> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use rstest::rstest;

    use super::*;
    use crate::providers::{ManualTime, MemoryMount, MemorySurface};

    const NOW: f64 = 1_700_000_000.0;

    fn clock_at(
        remaining: f64,
        options: ClockOptions,
    ) -> (Clock<ManualTime, MemorySurface>, ManualTime, MemorySurface) {
        let time = ManualTime::new(NOW);
        let surface = MemorySurface::new();
        let clock =
            Clock::with_time(NOW + remaining, surface.clone(), options, time.clone()).unwrap();
        (clock, time, surface)
    }

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&count), count)
    }

    #[test]
    fn invalid_target_fails_fast() {
        let err = Clock::new(f64::NAN, MemorySurface::new(), ClockOptions::default()).unwrap_err();
        assert!(matches!(err, ClockError::InvalidArgument(_)));

        let err = Clock::new("soon", MemorySurface::new(), ClockOptions::default()).unwrap_err();
        assert!(matches!(err, ClockError::InvalidArgument(_)));
    }

    #[test]
    fn missing_anchor_fails_fast() {
        let mut mount = MemoryMount::new();
        mount.insert("flipdown");

        let err = Clock::mount(NOW, &mount, "elsewhere", ClockOptions::default()).unwrap_err();
        assert_eq!(err, ClockError::MissingMount("elsewhere".to_string()));
        assert!(Clock::mount(NOW, &mount, "flipdown", ClockOptions::default()).is_ok());
    }

    #[test]
    fn theme_applied_at_construction() {
        let (_clock, _time, surface) = clock_at(10.0, ClockOptions::default().with_theme("light"));
        assert_eq!(surface.snapshot().theme, "light");
    }

    #[rstest]
    #[case::down(Direction::Down, true, 5.5, 5.5)]
    #[case::down_clamped(Direction::Down, true, -3.0, 0.0)]
    #[case::down_overtime(Direction::Down, false, -3.0, 3.0)]
    #[case::down_at_zero(Direction::Down, false, 0.0, 0.0)]
    #[case::up_before_epoch(Direction::Up, true, 5.0, 0.0)]
    #[case::up_after_epoch(Direction::Up, true, -7.0, 7.0)]
    fn display_span_rules(
        #[case] direction: Direction,
        #[case] stop_at_end: bool,
        #[case] remaining: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(display_span(direction, stop_at_end, remaining), expected);
    }

    #[rstest]
    #[case::negative(-86_400.0 * 3.0, 2)]
    #[case::two_days(86_400.0 * 2.0, 2)]
    #[case::ninety_nine(86_400.0 * 99.5, 2)]
    #[case::hundred(86_400.0 * 100.0, 3)]
    #[case::thousands(86_400.0 * 1234.0 + 1.0, 4)]
    fn day_group_width(#[case] remaining: f64, #[case] expected: usize) {
        assert_eq!(day_rotors(remaining), expected);
    }

    #[tokio::test]
    async fn tick_decomposes_remaining_time() {
        let (clock, _time, surface) = clock_at(90_000.0, ClockOptions::default());
        let report = clock.tick().await;

        assert_eq!(report.values, UnitValues { days: 1, hours: 1, minutes: 0, seconds: 0 });
        assert_eq!(report.remaining, 90_000.0);
        let view = surface.snapshot();
        assert_eq!(view.group(Unit::Days).text(), "01");
        assert_eq!(view.group(Unit::Hours).text(), "01");
        assert_eq!(view.group(Unit::Minutes).text(), "00");
        assert_eq!(view.group(Unit::Seconds).text(), "00");
        assert_eq!(view.group(Unit::Days).label.as_deref(), Some("Days"));
        assert_eq!(view.group(Unit::Hours).delimiter.as_deref(), Some(":"));
    }

    #[tokio::test]
    async fn fractional_remaining_is_floored() {
        let (clock, _time, _surface) = clock_at(61.9, ClockOptions::default());
        let report = clock.tick().await;
        assert_eq!(report.values.total(), 61);
        assert_eq!(clock.group_text(Unit::Seconds).await, "01");
    }

    #[tokio::test]
    async fn ended_fires_exactly_once() {
        let (ended, ended_count) = counter();
        let (one_shot, one_shot_count) = counter();
        let options = ClockOptions::default().on_ended(move |_| {
            ended.fetch_add(1, Ordering::SeqCst);
        });
        let (clock, time, surface) = clock_at(2.0, options);
        clock
            .if_ended(move || {
                one_shot.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        let mut crossings = 0;
        for _ in 0..6 {
            if clock.tick().await.ended_now {
                crossings += 1;
            }
            time.advance(1.0);
        }

        assert_eq!(crossings, 1);
        assert_eq!(ended_count.load(Ordering::SeqCst), 1);
        assert_eq!(one_shot_count.load(Ordering::SeqCst), 1);
        assert!(clock.is_ended().await);
        assert!(surface.snapshot().ended);
    }

    #[tokio::test]
    async fn countdown_reaches_zero_before_ending() {
        let (clock, time, _surface) = clock_at(2.0, ClockOptions::default());

        let report = clock.tick().await;
        assert_eq!(clock.group_text(Unit::Seconds).await, "02");
        assert!(!report.ended_now);

        time.advance(2.0);
        let report = clock.tick().await;
        assert_eq!(clock.group_text(Unit::Seconds).await, "00");
        assert!(!report.ended_now);
        assert!(!clock.is_ended().await);

        time.advance(1.0);
        let report = clock.tick().await;
        assert!(report.ended_now);
        assert_eq!(report.remaining, -1.0);
        assert_eq!(clock.group_text(Unit::Seconds).await, "00");
    }

    #[rstest]
    #[case::clamped(true, UnitValues::default())]
    #[case::overtime(false, UnitValues { days: 0, hours: 1, minutes: 1, seconds: 1 })]
    #[tokio::test]
    async fn clamp_policy(#[case] stop_at_end: bool, #[case] expected: UnitValues) {
        let options = ClockOptions { stop_at_end, ..Default::default() };
        let (clock, _time, _surface) = clock_at(-3_661.0, options);
        let report = clock.tick().await;
        assert_eq!(report.values, expected);
        assert!(report.ended_now);
    }

    #[tokio::test]
    async fn counting_up_shows_elapsed() {
        let options = ClockOptions { direction: Direction::Up, ..Default::default() };
        let (clock, time, _surface) = clock_at(3.0, options);

        assert_eq!(clock.tick().await.values.total(), 0);
        time.advance(3_664.0);
        let report = clock.tick().await;
        assert_eq!(report.values, UnitValues { days: 0, hours: 1, minutes: 1, seconds: 1 });
        assert!(report.ended_now);
    }

    #[tokio::test]
    async fn wide_day_count_gets_wide_group() {
        let (clock, _time, surface) = clock_at(86_400.0 * 1234.0 + 1.0, ClockOptions::default());
        clock.tick().await;
        assert_eq!(clock.group_text(Unit::Days).await, "1234");
        assert_eq!(surface.snapshot().group(Unit::Days).rotors.len(), 4);
    }

    #[tokio::test]
    async fn day_group_grows_when_overflowing() {
        let options = ClockOptions { rotor: Some(2), ..Default::default() };
        let (clock, _time, _surface) = clock_at(86_400.0 * 1234.0, options);
        clock.tick().await;
        assert_eq!(clock.group_text(Unit::Days).await, "1234");
        assert_eq!(clock.group_text(Unit::Hours).await, "00");
    }

    #[tokio::test]
    async fn rotor_override_applies_to_all_groups() {
        let options = ClockOptions { rotor: Some(3), ..Default::default() };
        let (clock, _time, _surface) = clock_at(3_661.0, options);
        clock.tick().await;
        assert_eq!(clock.group_text(Unit::Days).await, "000");
        assert_eq!(clock.group_text(Unit::Hours).await, "001");
        assert_eq!(clock.group_text(Unit::Seconds).await, "001");
    }

    #[rstest]
    #[case::seconds_only(10.0, [false, false, false, true])]
    #[case::with_minutes(70.0, [false, false, true, true])]
    #[case::zero_hours_inside(86_400.0 + 5.0, [true, true, true, true])]
    #[case::expired(-5.0, [false, false, false, true])]
    #[tokio::test]
    async fn auto_hides_leading_zero_groups(#[case] remaining: f64, #[case] visible: [bool; 4]) {
        let (clock, _time, surface) = clock_at(remaining, ClockOptions::default());
        clock.tick().await;
        let view = surface.snapshot();
        let shown = Unit::ALL.map(|unit| view.group(unit).visible);
        assert_eq!(shown, visible);
    }

    #[rstest]
    #[case::overtime(
        5.0,
        ClockOptions { stop_at_end: false, ..Default::default() },
        130.0,
        [false, false, true, true]
    )]
    #[case::counting_up(
        0.0,
        ClockOptions { direction: Direction::Up, ..Default::default() },
        3_700.0,
        [false, true, true, true]
    )]
    #[case::counting_up_past_a_day(
        0.0,
        ClockOptions { direction: Direction::Up, ..Default::default() },
        86_430.0,
        [true, true, true, true]
    )]
    #[tokio::test]
    async fn hidden_groups_reappear_when_they_grow(
        #[case] remaining: f64,
        #[case] options: ClockOptions,
        #[case] advance: f64,
        #[case] visible: [bool; 4],
    ) {
        let (clock, time, surface) = clock_at(remaining, options);
        clock.tick().await;
        assert!(!surface.snapshot().group(Unit::Minutes).visible);

        time.advance(advance);
        clock.tick().await;
        let view = surface.snapshot();
        let shown = Unit::ALL.map(|unit| view.group(unit).visible);
        assert_eq!(shown, visible);
    }

    #[tokio::test]
    async fn overtime_line_shows_minutes() {
        let options = ClockOptions { stop_at_end: false, ..Default::default() };
        let (clock, time, surface) = clock_at(5.0, options);
        clock.tick().await;
        time.advance(130.0);
        let report = clock.tick().await;

        assert_eq!(report.values.minutes, 2);
        assert_eq!(report.values.seconds, 5);
        assert_eq!(surface.snapshot().render_line(), "02 Minutes : 05 Seconds");
    }

    #[tokio::test]
    async fn hiding_is_decided_once() {
        let (clock, time, surface) = clock_at(61.0, ClockOptions::default());
        clock.tick().await;
        time.advance(2.0);
        clock.tick().await;
        assert_eq!(clock.group_text(Unit::Minutes).await, "00");
        assert!(surface.snapshot().group(Unit::Minutes).visible);
    }

    #[tokio::test]
    async fn all_digits_mode_shows_everything() {
        let options = ClockOptions { digits: DigitsMode::All, ..Default::default() };
        let (clock, _time, surface) = clock_at(10.0, options);
        clock.tick().await;
        assert!(surface.snapshot().groups.iter().all(|group| group.visible));
    }

    #[tokio::test]
    async fn headings_and_delimiters_can_be_omitted() {
        let options = ClockOptions { headings: None, delimiters: None, ..Default::default() };
        let (clock, _time, surface) = clock_at(90_000.0, options);
        clock.tick().await;
        let view = surface.snapshot();
        assert!(view.groups.iter().all(|group| group.label.is_none()));
        assert!(view.groups.iter().all(|group| group.delimiter.is_none()));
        assert_eq!(view.render_line(), "01 01 00 00");
    }

    #[tokio::test]
    async fn tick_callback_sees_signed_remaining() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = ClockOptions::default().on_tick(move |remaining, now| {
            sink.lock().unwrap().push((remaining, now));
        });
        let (clock, time, _surface) = clock_at(1.0, options);

        clock.tick().await;
        time.advance(3.0);
        clock.tick().await;

        assert_eq!(*seen.lock().unwrap(), vec![(1.0, NOW), (-2.0, NOW + 3.0)]);
    }

    #[tokio::test]
    async fn late_one_shot_fires_on_next_tick() {
        let (clock, _time, _surface) = clock_at(-1.0, ClockOptions::default());
        clock.tick().await;
        assert!(clock.is_ended().await);

        let (fired, count) = counter();
        clock
            .if_ended(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        clock.tick().await;
        clock.tick().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_callback_is_isolated() {
        let options = ClockOptions::default().on_tick(|_, _| panic!("boom"));
        let (clock, time, _surface) = clock_at(5.0, options);

        clock.tick().await;
        time.advance(1.0);
        clock.tick().await;

        assert_eq!(clock.callback_failures(), 2);
        assert_eq!(clock.group_text(Unit::Seconds).await, "04");
    }

    #[tokio::test]
    async fn theme_accessors() {
        let (clock, _time, surface) = clock_at(5.0, ClockOptions::default());
        assert_eq!(clock.theme().await, "dark");
        clock.set_theme("light").await;
        assert_eq!(clock.theme().await, "light");
        assert_eq!(surface.snapshot().theme, "light");
    }

    #[tokio::test(start_paused = true)]
    async fn flips_settle_on_timer() {
        let (clock, time, surface) = clock_at(10.0, ClockOptions::default());
        clock.tick().await;
        time.advance(1.0);
        clock.tick().await;
        assert!(surface.snapshot().group(Unit::Seconds).is_flipping());

        sleep(Duration::from_millis(600)).await;
        let view = surface.snapshot();
        assert!(!view.group(Unit::Seconds).is_flipping());
        assert_eq!(view.group(Unit::Seconds).text(), "09");
        assert_eq!(view.flips, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn flips_settle_on_surface_report() {
        let options = ClockOptions::default().with_settle(SettleMode::Surface);
        let (clock, time, surface) = clock_at(10.0, options);
        clock.start().await;
        time.advance(1.0);
        clock.tick().await;

        sleep(Duration::from_millis(600)).await;
        assert!(surface.snapshot().group(Unit::Seconds).is_flipping());

        let sender = clock.settle_sender();
        sender.send(DigitAddr::new(Unit::Seconds, 0)).unwrap();
        sender.send(DigitAddr::new(Unit::Seconds, 1)).unwrap();
        sleep(Duration::from_millis(10)).await;
        assert!(!surface.snapshot().group(Unit::Seconds).is_flipping());

        clock.stop().await;
    }

    #[tokio::test]
    async fn finish_flip_without_runner() {
        let options = ClockOptions::default().with_settle(SettleMode::Surface);
        let (clock, time, _surface) = clock_at(10.0, options);
        clock.tick().await;
        time.advance(1.0);
        clock.tick().await;

        let ones = DigitAddr::new(Unit::Seconds, 0);
        assert!(clock.finish_flip(ones).await);
        assert!(!clock.finish_flip(ones).await);
    }

    #[tokio::test(start_paused = true)]
    async fn start_ticks_immediately_then_every_second() {
        let (ticked, ticks) = counter();
        let options = ClockOptions::default().on_tick(move |_, _| {
            ticked.fetch_add(1, Ordering::SeqCst);
        });
        let (clock, _time, surface) = clock_at(100.0, options);

        clock.start().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert!(clock.is_running().await);

        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 4);

        // starting again does not add a second ticker
        clock.start().await;
        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 5);

        clock.stop().await;
        assert!(!clock.is_running().await);
        assert!(surface.snapshot().stopped);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resamples_time() {
        let (clock, time, surface) = clock_at(100.0, ClockOptions::default());
        clock.start().await;
        clock.stop().await;
        assert_eq!(clock.group_text(Unit::Minutes).await, "01");

        time.advance(50.0);
        clock.start().await;
        assert_eq!(clock.now().await, NOW + 50.0);
        assert_eq!(clock.group_text(Unit::Minutes).await, "00");
        assert_eq!(clock.group_text(Unit::Seconds).await, "50");
        assert!(!surface.snapshot().stopped);
        clock.stop().await;
    }

    #[tokio::test]
    async fn stop_when_stopped_is_noop() {
        let (clock, _time, surface) = clock_at(100.0, ClockOptions::default());
        clock.stop().await;
        assert!(!surface.snapshot().stopped);
        assert!(!clock.is_running().await);
    }
}
