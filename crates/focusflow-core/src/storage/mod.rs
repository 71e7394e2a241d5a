//! Storage contracts and their implementations.
//!
//! The timer and the statistics only ever see [`SessionStore`] and
//! [`TaskStore`]; SQLite ([`Database`]) and in-memory fakes are
//! interchangeable behind them.

mod config;
pub mod database;
mod memory;
mod writer;

pub use config::{Config, DashboardSettings, TimerSettings};
pub use database::Database;
pub use memory::{MemorySessionStore, MemoryTaskStore};
pub use writer::{PendingAppend, SessionWriter};

use std::path::PathBuf;

use crate::error::{Result, StoreError};
use crate::session::{FocusSession, Task};

/// Durable append-only log of completed sessions.
pub trait SessionStore: Send + Sync {
    /// Append one record. Rejects records with an empty id or a
    /// non-positive duration.
    fn append(&self, session: &FocusSession) -> Result<(), StoreError>;

    /// Every stored record, in no particular order.
    fn list_all(&self) -> Result<Vec<FocusSession>, StoreError>;

    /// Remove every record.
    fn clear_all(&self) -> Result<(), StoreError>;
}

/// Read-only view of the task list.
pub trait TaskStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<Task>, StoreError>;
}

/// Returns the data directory, creating it if needed.
///
/// `FOCUSFLOW_DATA_DIR` wins outright. Otherwise `~/.config/focusflow[-dev]/`
/// based on `FOCUSFLOW_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOCUSFLOW_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusflow-dev")
            } else {
                base_dir.join("focusflow")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
