//! Once-per-second scheduling for a [`TimerEngine`].
//!
//! [`TimerDriver`] moves the engine into a single tokio task and talks to it
//! over a command channel, so every transition is serialized without locks.
//! The interval only feeds `tick()` while the engine is running, and pending
//! commands always win over a due tick: once a pause/reset/switch has been
//! processed no further tick reaches the engine.
//!
//! ```ignore
//! let (handle, mut events) = TimerDriver::new(engine).spawn();
//! handle.start().await?;
//! while let Some(event) = events.recv().await { /* render */ }
//! ```

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::engine::{TickOutcome, TimerEngine, TimerState};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::session::Mode;
use crate::storage::PendingAppend;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Start(Reply<Option<Event>>),
    Pause(Reply<Option<Event>>),
    Reset(Reply<Event>),
    SwitchMode(Mode, Reply<Event>),
    Configure {
        focus_minutes: i64,
        break_minutes: i64,
        reply: Reply<Result<Event>>,
    },
    SelectTask(Option<i64>, Reply<Result<Event>>),
    State(Reply<TimerState>),
    Snapshot(Reply<Event>),
    Shutdown(Reply<()>),
}

/// Owns a [`TimerEngine`] and ticks it while running.
pub struct TimerDriver {
    engine: TimerEngine,
    period: Duration,
}

impl TimerDriver {
    pub fn new(engine: TimerEngine) -> Self {
        Self {
            engine,
            period: TICK_PERIOD,
        }
    }

    /// Override the tick period. `timer run --tick-ms` uses this.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Spawn the driver task on the current tokio runtime.
    ///
    /// The task ends when every [`TimerHandle`] is dropped or on
    /// [`TimerHandle::shutdown`].
    pub fn spawn(self) -> (TimerHandle, mpsc::UnboundedReceiver<Event>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let worker = Worker {
            engine: self.engine,
            period: self.period,
            commands: cmd_rx,
            events: event_tx,
        };
        tokio::spawn(worker.run());
        (TimerHandle { commands: cmd_tx }, event_rx)
    }
}

struct Worker {
    engine: TimerEngine,
    period: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event>,
}

impl Worker {
    async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = self.period.as_millis() as u64, "timer driver started");

        loop {
            tokio::select! {
                biased;

                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else { break };
                    let was_running = self.engine.is_running();
                    if !self.handle(cmd) {
                        break;
                    }
                    if !was_running && self.engine.is_running() {
                        // First tick one full period after (re)start.
                        ticker.reset();
                    }
                }
                _ = ticker.tick(), if self.engine.is_running() => {
                    self.on_tick();
                }
            }
        }

        info!("timer driver stopped");
    }

    /// Returns `false` when the loop should exit.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Start(reply) => {
                let event = self.engine.start();
                self.emit_opt(&event);
                let _ = reply.send(event);
            }
            Command::Pause(reply) => {
                let event = self.engine.pause();
                self.emit_opt(&event);
                let _ = reply.send(event);
            }
            Command::Reset(reply) => {
                let event = self.engine.reset();
                self.emit(event.clone());
                let _ = reply.send(event);
            }
            Command::SwitchMode(mode, reply) => {
                let event = self.engine.switch_mode(mode);
                self.emit(event.clone());
                let _ = reply.send(event);
            }
            Command::Configure {
                focus_minutes,
                break_minutes,
                reply,
            } => {
                let result = self.engine.configure(focus_minutes, break_minutes);
                if let Ok(ref event) = result {
                    self.emit(event.clone());
                }
                let _ = reply.send(result);
            }
            Command::SelectTask(task_id, reply) => {
                let result = self.engine.select_task(task_id);
                if let Ok(ref event) = result {
                    self.emit(event.clone());
                }
                let _ = reply.send(result);
            }
            Command::State(reply) => {
                let _ = reply.send(self.engine.state());
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Shutdown(reply) => {
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn on_tick(&mut self) {
        match self.engine.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Counting { seconds_remaining } => {
                self.emit(Event::Tick {
                    mode: self.engine.mode(),
                    seconds_remaining,
                    at: Utc::now(),
                });
            }
            TickOutcome::Completed(done) => {
                self.emit(done.event());
                if let Some(pending) = done.append {
                    self.report(pending);
                }
            }
        }
    }

    /// Forward the append outcome without holding up the next tick.
    fn report(&self, pending: PendingAppend) {
        let events = self.events.clone();
        tokio::spawn(async move {
            let session_id = pending.session_id().to_string();
            let event = match pending.wait().await {
                Ok(()) => {
                    debug!(%session_id, "session persisted");
                    Event::SessionPersisted {
                        session_id,
                        at: Utc::now(),
                    }
                }
                Err(e) => {
                    warn!(%session_id, error = %e, "session not persisted");
                    Event::PersistenceFailed {
                        session_id,
                        reason: e.to_string(),
                        at: Utc::now(),
                    }
                }
            };
            let _ = events.send(event);
        });
    }

    fn emit(&self, event: Event) {
        // No subscriber is not an error.
        let _ = self.events.send(event);
    }

    fn emit_opt(&self, event: &Option<Event>) {
        if let Some(event) = event {
            self.emit(event.clone());
        }
    }
}

/// Cloneable front end to a running [`TimerDriver`].
#[derive(Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl TimerHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .map_err(|_| CoreError::DriverStopped)?;
        rx.await.map_err(|_| CoreError::DriverStopped)
    }

    /// `None` if the timer was already running.
    pub async fn start(&self) -> Result<Option<Event>> {
        self.request(Command::Start).await
    }

    /// `None` if the timer was not running.
    pub async fn pause(&self) -> Result<Option<Event>> {
        self.request(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<Event> {
        self.request(Command::Reset).await
    }

    pub async fn switch_mode(&self, mode: Mode) -> Result<Event> {
        self.request(|reply| Command::SwitchMode(mode, reply)).await
    }

    pub async fn configure(&self, focus_minutes: i64, break_minutes: i64) -> Result<Event> {
        self.request(|reply| Command::Configure {
            focus_minutes,
            break_minutes,
            reply,
        })
        .await?
    }

    pub async fn select_task(&self, task_id: Option<i64>) -> Result<Event> {
        self.request(|reply| Command::SelectTask(task_id, reply))
            .await?
    }

    pub async fn state(&self) -> Result<TimerState> {
        self.request(Command::State).await
    }

    pub async fn snapshot(&self) -> Result<Event> {
        self.request(Command::Snapshot).await
    }

    /// Stop the driver task. Later calls on any handle fail with
    /// [`CoreError::DriverStopped`].
    pub async fn shutdown(&self) -> Result<()> {
        self.request(Command::Shutdown).await
    }
}
