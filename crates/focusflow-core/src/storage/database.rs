//! SQLite-based session and task storage.
//!
//! Provides persistent storage for:
//! - Completed focus/break sessions (append-only, bulk clear)
//! - The task list the timer labels sessions with

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{data_dir, SessionStore, TaskStore};
use crate::error::{AggregationInputError, CoreError, StoreError};
use crate::session::{FocusSession, Mode, Task};

/// SQLite database for sessions and tasks.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `<data_dir>/focusflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("focusflow.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".into()))
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id               TEXT PRIMARY KEY,
                task_id          INTEGER,
                mode             TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL,
                ended_at         TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                title     TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_ended_at ON sessions(ended_at);",
        )?;
        Ok(())
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Create a task with a non-empty title.
    pub fn create_task(&self, title: &str) -> Result<Task, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Rejected("title is required".into()));
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tasks (title, completed) VALUES (?1, 0)",
            params![title],
        )?;
        Ok(Task {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            completed: false,
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let conn = self.conn()?;
        let task = conn
            .query_row(
                "SELECT id, title, completed FROM tasks WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Task {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        completed: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(task)
    }

    pub fn set_task_completed(&self, id: i64, completed: bool) -> Result<Task, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE tasks SET completed = ?1 WHERE id = ?2",
            params![completed, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("task {id}")));
        }
        self.get_task(id)?
            .ok_or_else(|| StoreError::NotFound(format!("task {id}")))
    }

    pub fn rename_task(&self, id: i64, title: &str) -> Result<Task, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Rejected("title is required".into()));
        }
        let changed = self.conn()?.execute(
            "UPDATE tasks SET title = ?1 WHERE id = ?2",
            params![title, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("task {id}")));
        }
        self.get_task(id)?
            .ok_or_else(|| StoreError::NotFound(format!("task {id}")))
    }

    pub fn delete_task(&self, id: i64) -> Result<(), StoreError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("task {id}")));
        }
        Ok(())
    }
}

fn decode_session(
    id: String,
    task_id: Option<i64>,
    mode: String,
    duration_seconds: i64,
    ended_at: String,
) -> Result<FocusSession, AggregationInputError> {
    let ended_at = DateTime::parse_from_rfc3339(&ended_at)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| AggregationInputError::UnparseableEndedAt {
            id: id.clone(),
            raw: ended_at.clone(),
        })?;
    let mode = mode
        .parse::<Mode>()
        .map_err(|_| AggregationInputError::UnknownMode {
            id: id.clone(),
            raw: mode.clone(),
        })?;
    let session = FocusSession {
        id,
        task_id,
        mode,
        duration_seconds,
        ended_at,
    };
    session.check()?;
    Ok(session)
}

impl SessionStore for Database {
    fn append(&self, session: &FocusSession) -> Result<(), StoreError> {
        session
            .check()
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        // Re-delivery of the same id is a no-op.
        self.conn()?.execute(
            "INSERT OR IGNORE INTO sessions (id, task_id, mode, duration_seconds, ended_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.id,
                session.task_id,
                session.mode.as_str(),
                session.duration_seconds,
                session.ended_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<FocusSession>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, task_id, mode, duration_seconds, ended_at
             FROM sessions
             ORDER BY ended_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, task_id, mode, duration_seconds, ended_at) = row?;
            match decode_session(id, task_id, mode, duration_seconds, ended_at) {
                Ok(session) => sessions.push(session),
                Err(e) => warn!(error = %e, "skipping malformed session row"),
            }
        }
        Ok(sessions)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        self.conn()?.execute("DELETE FROM sessions", [])?;
        Ok(())
    }
}

impl TaskStore for Database {
    fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, title, completed FROM tasks ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Task {
                id: row.get(0)?,
                title: row.get(1)?,
                completed: row.get(2)?,
            })
        })?;
        let tasks = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}
