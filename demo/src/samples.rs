//! Sample clocks shown on the demo board.

use std::sync::Arc;

use flipdown::{
    Clock, ClockError, ClockOptions, MemoryMount, MemorySurface, SECONDS_PER_DAY, SurfaceView,
    TimeSource, WallTime,
};
use tracing::info;

/// One sample: a titled clock on its own anchor.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Anchor the clock is mounted on.
    pub anchor: &'static str,
    /// Panel title.
    pub title: &'static str,
    /// Seconds from now to the target.
    pub offset: f64,
    /// Options for the clock.
    pub options: ClockOptions,
}

/// The default sample set.
pub fn samples() -> Vec<Sample> {
    let day = SECONDS_PER_DAY as f64;
    let localized = ["日", "時", "分", "秒"].map(String::from);
    vec![
        Sample {
            anchor: "flipdown1",
            title: "2 days (normal)",
            offset: day * 2.0 + 1.0,
            options: ClockOptions::default().with_theme("light"),
        },
        Sample {
            anchor: "flipdown2",
            title: "no days",
            offset: day * 0.4 + 1.0,
            options: ClockOptions::default().with_theme("dark"),
        },
        Sample {
            anchor: "flipdown3",
            title: "no days no hour",
            offset: 11.0,
            options: ClockOptions::default(),
        },
        Sample {
            anchor: "flipdown4",
            title: "4 digits for day",
            offset: day * 1234.0 + 1.0,
            options: ClockOptions::default(),
        },
        Sample {
            anchor: "flipdown5",
            title: "localized headings",
            offset: day * 2.0 + 1.0,
            options: ClockOptions { headings: Some(localized), ..ClockOptions::default() },
        },
        Sample {
            anchor: "flipdown6",
            title: "no headings",
            offset: day * 0.4 + 1.0,
            options: ClockOptions { headings: None, ..ClockOptions::default() },
        },
    ]
}

/// A mounted sample clock and the surface it draws on.
#[derive(Debug)]
pub struct Board {
    /// Panel title.
    pub title: &'static str,
    /// The running clock.
    pub clock: Clock<WallTime, MemorySurface>,
    /// Read handle of the clock's surface.
    pub surface: MemorySurface,
}

/// Shared handle to a board.
pub type SharedBoard = Arc<Board>;

impl Board {
    /// Mounts every sample, counting toward `now + base_offset + offset`.
    pub fn mount_all(
        samples: Vec<Sample>,
        base_offset: f64,
    ) -> Result<Vec<SharedBoard>, ClockError> {
        let mut mount = MemoryMount::new();
        for sample in &samples {
            mount.insert(sample.anchor);
        }

        let now = WallTime.now();
        let mut boards = Vec::with_capacity(samples.len());
        for sample in samples {
            let target = now + base_offset + sample.offset;
            let title = sample.title;
            let clock = Clock::mount(target, &mount, sample.anchor, sample.options)?;
            let surface = mount
                .get(sample.anchor)
                .cloned()
                .ok_or_else(|| ClockError::MissingMount(sample.anchor.to_string()))?;
            boards.push(Arc::new(Self { title, clock, surface }));
        }
        Ok(boards)
    }

    /// Starts the clock and registers its end notice.
    pub async fn start(&self) {
        let title = self.title;
        self.clock
            .if_ended(move || {
                info!(title, "the countdown has ended");
            })
            .await
            .start()
            .await;
    }

    /// Stops the clock.
    pub async fn stop(&self) {
        self.clock.stop().await;
    }

    /// Returns a snapshot of the surface.
    pub fn view(&self) -> SurfaceView {
        self.surface.snapshot()
    }
}
