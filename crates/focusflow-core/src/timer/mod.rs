mod config;
mod driver;
mod engine;

pub use config::{
    TimerConfig, BREAK_MINUTES_MAX, BREAK_MINUTES_MIN, FOCUS_MINUTES_MAX, FOCUS_MINUTES_MIN,
};
pub use driver::{TimerDriver, TimerHandle, TICK_PERIOD};
pub use engine::{format_mm_ss, Completion, TickOutcome, TimerEngine, TimerState};
