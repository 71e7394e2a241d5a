//! Timer engine implementation.
//!
//! The timer engine is a countdown state machine over
//! `{Focus, Break} x {Running, Stopped}`. It does not use internal threads:
//! something else (normally [`TimerDriver`](super::TimerDriver)) calls
//! `tick()` once per second while it is running.
//!
//! Completion is reached by counting `secondsRemaining` down to exactly zero,
//! never by comparing wall-clock time, so a paused timer never catches up.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped --start--> Running --pause/reset/switch_mode--> Stopped
//! Running --tick to 0--> Stopped (mode flipped, focus cycles recorded)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerConfig::default(), writer);
//! engine.start();
//! // Once per second:
//! if let TickOutcome::Completed(done) = engine.tick() { /* ... */ }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::config::TimerConfig;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::session::{FocusSession, Mode};
use crate::storage::{PendingAppend, SessionWriter};

/// Runtime state of one timer instance. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub mode: Mode,
    pub seconds_remaining: u64,
    pub running: bool,
    pub selected_task_id: Option<i64>,
}

/// What a single `tick()` did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Timer was stopped; nothing changed.
    Idle,
    /// One second elapsed, countdown still positive.
    Counting { seconds_remaining: u64 },
    /// Countdown reached zero.
    Completed(Completion),
}

/// A finished countdown.
#[derive(Debug)]
pub struct Completion {
    pub finished: Mode,
    pub next: Mode,
    /// The record handed to the store, for focus cycles only.
    pub session: Option<FocusSession>,
    /// Outcome of the store append; the timer has already moved on.
    pub append: Option<PendingAppend>,
    pub at: DateTime<Utc>,
}

impl Completion {
    pub fn event(&self) -> Event {
        Event::CycleCompleted {
            finished: self.finished,
            next: self.next,
            session: self.session.clone(),
            at: self.at,
        }
    }
}

/// Core timer engine.
#[derive(Debug)]
pub struct TimerEngine {
    config: TimerConfig,
    mode: Mode,
    seconds_remaining: u64,
    running: bool,
    selected_task_id: Option<i64>,
    writer: SessionWriter,
}

impl TimerEngine {
    /// Create a stopped engine in focus mode with a full countdown.
    pub fn new(config: TimerConfig, writer: SessionWriter) -> Self {
        Self {
            config,
            mode: Mode::Focus,
            seconds_remaining: config.duration_secs(Mode::Focus),
            running: false,
            selected_task_id: None,
            writer,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            running: self.running,
            selected_task_id: self.selected_task_id,
        }
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn selected_task_id(&self) -> Option<i64> {
        self.selected_task_id
    }

    pub fn duration_for(&self, mode: Mode) -> u64 {
        self.config.duration_secs(mode)
    }

    /// 0.0 ..= 1.0 share of the current countdown still left.
    pub fn progress(&self) -> f64 {
        let total = self.duration_for(self.mode);
        if total == 0 {
            return 0.0;
        }
        (self.seconds_remaining as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            running: self.running,
            seconds_remaining: self.seconds_remaining,
            total_seconds: self.duration_for(self.mode),
            selected_task_id: self.selected_task_id,
            display: format_mm_ss(self.seconds_remaining),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace both durations. Only allowed while stopped; the display
    /// resets to the full duration of the current mode.
    ///
    /// # Errors
    /// [`CoreError::IllegalStateTransition`] while running,
    /// [`CoreError::InvalidConfig`] for out-of-range values. State is
    /// unchanged on error.
    pub fn configure(&mut self, focus_minutes: i64, break_minutes: i64) -> Result<Event> {
        self.require_stopped("configure")?;
        let config = TimerConfig::new(focus_minutes, break_minutes)?;
        self.config = config;
        self.seconds_remaining = self.duration_for(self.mode);
        info!(
            focus_minutes = config.focus_minutes(),
            break_minutes = config.break_minutes(),
            "timer configured"
        );
        Ok(Event::Configured {
            focus_minutes: config.focus_minutes(),
            break_minutes: config.break_minutes(),
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Choose the task the next focus session is credited to. The id is
    /// not checked against any task store.
    ///
    /// # Errors
    /// [`CoreError::IllegalStateTransition`] while running.
    pub fn select_task(&mut self, task_id: Option<i64>) -> Result<Event> {
        self.require_stopped("select a task")?;
        self.selected_task_id = task_id;
        debug!(?task_id, "task selected");
        Ok(Event::TaskSelected {
            task_id,
            at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        info!(mode = %self.mode, seconds_remaining = self.seconds_remaining, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        info!(mode = %self.mode, seconds_remaining = self.seconds_remaining, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Stop and discard any in-progress countdown.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.seconds_remaining = self.duration_for(self.mode);
        info!(mode = %self.mode, "timer reset");
        Event::TimerReset {
            mode: self.mode,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }
    }

    /// Stop, switch to `target` and load its full duration. Switching while
    /// running is a pause followed by the switch.
    pub fn switch_mode(&mut self, target: Mode) -> Event {
        let from = self.mode;
        self.running = false;
        self.mode = target;
        self.seconds_remaining = self.duration_for(target);
        info!(%from, to = %target, "mode switched");
        Event::ModeSwitched {
            from,
            to: target,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }
    }

    /// Advance one second, stamping a completion with the current time.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Utc::now())
    }

    /// Advance one second. No-op while stopped.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return TickOutcome::Counting {
                seconds_remaining: self.seconds_remaining,
            };
        }

        self.running = false;
        let finished = self.mode;

        let (session, append) = if finished == Mode::Focus {
            let session = FocusSession::new(
                self.selected_task_id,
                Mode::Focus,
                self.duration_for(Mode::Focus) as i64,
                now,
            );
            let pending = self.writer.submit(session.clone());
            (Some(session), Some(pending))
        } else {
            (None, None)
        };

        let next = finished.opposite();
        self.mode = next;
        self.seconds_remaining = self.duration_for(next);
        info!(%finished, %next, "cycle completed");

        TickOutcome::Completed(Completion {
            finished,
            next,
            session,
            append,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require_stopped(&self, operation: &'static str) -> Result<()> {
        if self.running {
            return Err(CoreError::IllegalStateTransition {
                operation,
                state: "running",
            });
        }
        Ok(())
    }
}

/// `MM:SS` rendering of a countdown. Minutes are not wrapped at 60.
pub fn format_mm_ss(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
