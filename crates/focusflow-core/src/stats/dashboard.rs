use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::aggregate::{
    current_streak_days, day_key, minutes_on_day, partition_valid, recent_days,
    session_count_on_day, top_tasks_by_focus_minutes, DayTotal, TaskFocus,
};
use crate::session::{FocusSession, Task};

/// Number of days shown in the history strip.
pub const HISTORY_DAYS: u32 = 7;

/// Everything the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub today_minutes: u64,
    pub today_sessions: u64,
    pub streak_days: u32,
    pub top_tasks: Vec<TaskFocus>,
    pub last_7_days: Vec<DayTotal>,
    /// Records left out because they were malformed.
    pub excluded_records: usize,
}

impl DashboardSummary {
    pub fn compute(
        sessions: &[FocusSession],
        tasks: &[Task],
        now: DateTime<Utc>,
        top_tasks_limit: usize,
    ) -> Self {
        let (_, rejected) = partition_valid(sessions);
        for reason in &rejected {
            warn!(%reason, "excluding session from dashboard");
        }

        let today = day_key(now);
        Self {
            today,
            today_minutes: minutes_on_day(sessions, today),
            today_sessions: session_count_on_day(sessions, today),
            streak_days: current_streak_days(sessions, today),
            top_tasks: top_tasks_by_focus_minutes(sessions, tasks, top_tasks_limit),
            last_7_days: recent_days(sessions, today, HISTORY_DAYS),
            excluded_records: rejected.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Mode;

    #[test]
    fn empty_dashboard() {
        let summary = DashboardSummary::compute(&[], &[], Utc::now(), 5);
        assert_eq!(summary.today_minutes, 0);
        assert_eq!(summary.today_sessions, 0);
        assert_eq!(summary.streak_days, 0);
        assert!(summary.top_tasks.is_empty());
        assert_eq!(summary.last_7_days.len(), 7);
        assert!(summary.last_7_days.iter().all(|d| d.minutes == 0));
        assert_eq!(summary.excluded_records, 0);
    }

    #[test]
    fn counts_excluded_records() {
        let now = Utc::now();
        let mut bad = FocusSession::new(None, Mode::Focus, 1500, now);
        bad.duration_seconds = 0;
        let good = FocusSession::new(None, Mode::Focus, 1500, now);
        let summary = DashboardSummary::compute(&[bad, good], &[], now, 5);
        assert_eq!(summary.excluded_records, 1);
        assert_eq!(summary.today_sessions, 1);
        assert_eq!(summary.today_minutes, 25);
        assert_eq!(summary.streak_days, 1);
        assert_eq!(summary.last_7_days.last().unwrap().minutes, 25);
    }
}
