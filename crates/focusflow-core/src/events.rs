use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{FocusSession, Mode};

/// Every state change of the timer produces an Event.
/// Hosts print or render them; persistence outcomes arrive the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: Mode,
        to: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    Configured {
        focus_minutes: u32,
        break_minutes: u32,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TaskSelected {
        task_id: Option<i64>,
        at: DateTime<Utc>,
    },
    /// One second of countdown elapsed.
    Tick {
        mode: Mode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero. `session` is set for focus cycles.
    CycleCompleted {
        finished: Mode,
        next: Mode,
        session: Option<FocusSession>,
        at: DateTime<Utc>,
    },
    SessionPersisted {
        session_id: String,
        at: DateTime<Utc>,
    },
    /// Non-fatal: the timer already moved on.
    PersistenceFailed {
        session_id: String,
        reason: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        running: bool,
        seconds_remaining: u64,
        total_seconds: u64,
        selected_task_id: Option<i64>,
        display: String,
        progress: f64,
        at: DateTime<Utc>,
    },
}
