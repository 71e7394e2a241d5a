//! # FocusFlow Core Library
//!
//! This library provides the core logic for FocusFlow, a task list paired
//! with a Pomodoro-style focus timer and a statistics dashboard. The CLI is
//! a thin host over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A countdown state machine; the caller invokes `tick()`
//!   once per second while it runs
//! - **Timer Driver**: A tokio task that owns an engine and does the ticking
//! - **Storage**: Session/task store contracts with SQLite and in-memory
//!   implementations, plus TOML configuration
//! - **Stats**: Pure aggregation of the session log into dashboard figures
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerDriver`]: One-second scheduling for an engine
//! - [`SessionStore`]: Append-only log of completed sessions
//! - [`DashboardSummary`]: Today's totals, streak and top tasks
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{AggregationInputError, ConfigError, CoreError, StoreError};
pub use events::Event;
pub use session::{FocusSession, Mode, Task};
pub use stats::{DashboardSummary, TaskFocus};
pub use storage::{
    Config, Database, MemorySessionStore, MemoryTaskStore, PendingAppend, SessionStore,
    SessionWriter, TaskStore,
};
pub use timer::{TickOutcome, TimerConfig, TimerDriver, TimerEngine, TimerHandle, TimerState};
