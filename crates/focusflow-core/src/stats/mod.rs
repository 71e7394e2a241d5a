//! Statistics for the dashboard.
//!
//! Stateless computations over a session snapshot: daily totals, the current
//! streak and the per-task focus ranking.

mod aggregate;
mod dashboard;

pub use aggregate::{
    current_streak_days, day_key, focus_sessions, minutes_on_day, partition_valid, recent_days,
    session_count_on_day, top_tasks_by_focus_minutes, DayTotal, TaskFocus,
};
pub use dashboard::{DashboardSummary, HISTORY_DAYS};
