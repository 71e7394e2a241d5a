//! In-memory stores, used by tests and as a throwaway backend.

use std::sync::{Mutex, MutexGuard};

use super::{SessionStore, TaskStore};
use crate::error::StoreError;
use crate::session::{FocusSession, Task};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a Vec half-written.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Session store backed by a `Vec`.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<FocusSession>>,
    fail_appends: Mutex<usize>,
    append_calls: Mutex<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` appends fail with [`StoreError::Unavailable`].
    pub fn fail_next_appends(&self, n: usize) {
        *lock(&self.fail_appends) = n;
    }

    /// Number of `append` calls seen, successful or not.
    pub fn append_calls(&self) -> usize {
        *lock(&self.append_calls)
    }
}

impl SessionStore for MemorySessionStore {
    fn append(&self, session: &FocusSession) -> Result<(), StoreError> {
        *lock(&self.append_calls) += 1;

        {
            let mut remaining = lock(&self.fail_appends);
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::Unavailable("simulated store outage".into()));
            }
        }

        session
            .check()
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        lock(&self.sessions).push(session.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<FocusSession>, StoreError> {
        Ok(lock(&self.sessions).clone())
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        lock(&self.sessions).clear();
        Ok(())
    }
}

/// Task store backed by a `Vec`.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }
}

impl TaskStore for MemoryTaskStore {
    fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(lock(&self.tasks).clone())
    }
}
