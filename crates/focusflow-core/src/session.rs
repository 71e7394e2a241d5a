//! Session records and the task metadata they point at.
//!
//! A [`FocusSession`] is created exactly once, when a countdown reaches
//! zero, and is never edited afterwards. Stores only append or bulk-clear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AggregationInputError;

/// Which kind of countdown is (or was) running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Focus,
    Break,
}

impl Mode {
    pub fn opposite(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::Break => "break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(Mode::Focus),
            "break" => Ok(Mode::Break),
            other => Err(format!("mode must be 'focus' or 'break', got '{other}'")),
        }
    }
}

/// One completed countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    /// Opaque client-generated id (random UUID).
    pub id: String,
    /// Task selected when the countdown finished, if any.
    pub task_id: Option<i64>,
    pub mode: Mode,
    /// Configured duration of the mode at completion time, not wall time.
    pub duration_seconds: i64,
    pub ended_at: DateTime<Utc>,
}

impl FocusSession {
    /// Build a record with a fresh random id.
    pub fn new(
        task_id: Option<i64>,
        mode: Mode,
        duration_seconds: i64,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id,
            mode,
            duration_seconds,
            ended_at,
        }
    }

    pub fn is_focus(&self) -> bool {
        self.mode == Mode::Focus
    }

    /// Shape checks shared by stores (on append) and statistics (on read).
    pub fn check(&self) -> Result<(), AggregationInputError> {
        if self.id.trim().is_empty() {
            return Err(AggregationInputError::EmptyId);
        }
        if self.duration_seconds <= 0 {
            return Err(AggregationInputError::InvalidDuration {
                id: self.id.clone(),
                duration_seconds: self.duration_seconds,
            });
        }
        Ok(())
    }
}

/// Task metadata as supplied by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_opposite_flips() {
        assert_eq!(Mode::Focus.opposite(), Mode::Break);
        assert_eq!(Mode::Break.opposite(), Mode::Focus);
    }

    #[test]
    fn mode_parses_lowercase_only() {
        assert_eq!("focus".parse::<Mode>(), Ok(Mode::Focus));
        assert_eq!("break".parse::<Mode>(), Ok(Mode::Break));
        assert!("Focus".parse::<Mode>().is_err());
    }

    #[test]
    fn new_sessions_get_distinct_ids() {
        let now = Utc::now();
        let a = FocusSession::new(None, Mode::Focus, 1500, now);
        let b = FocusSession::new(None, Mode::Focus, 1500, now);
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let session = FocusSession::new(Some(3), Mode::Focus, 1500, Utc::now());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["taskId"], 3);
        assert_eq!(json["mode"], "focus");
        assert_eq!(json["durationSeconds"], 1500);
        assert!(json["endedAt"].is_string());
    }

    #[test]
    fn check_rejects_bad_shapes() {
        let mut session = FocusSession::new(None, Mode::Break, 300, Utc::now());
        assert!(session.check().is_ok());

        session.duration_seconds = 0;
        assert!(matches!(
            session.check(),
            Err(AggregationInputError::InvalidDuration { .. })
        ));

        session.duration_seconds = 300;
        session.id = "  ".into();
        assert_eq!(session.check(), Err(AggregationInputError::EmptyId));
    }
}
