#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod clock;
pub use clock::{Clock, SettleSender, TICK_INTERVAL};

mod config;
pub use config::{
    ClockOptions, ClockOverrides, ConfigError, DEFAULT_THEME, EndedCallback, FLIP_DURATION,
    LabelsSetting, SettleMode, TickCallback, default_delimiters, default_headings,
};

mod digit;
pub use digit::{Flip, FlipPhase, RotorDigit};

mod group;
pub use group::{DEFAULT_ROTORS, Delimiter, Heading, LabeledSlot, RotorGroup};

mod providers;
pub use providers::{
    GroupView, ManualTime, MemoryMount, MemorySurface, RotorView, SurfaceView, WallTime,
};

mod traits;
pub use traits::{Mount, RenderSurface, TimeSource};

mod types;
pub use types::{
    ClockError, DigitAddr, DigitsMode, Direction, Epoch, Face, HeadingPosition, SECONDS_PER_DAY,
    SECONDS_PER_HOUR, SECONDS_PER_MINUTE, Slot, Target, TickReport, Unit, UnitValues,
};
