//! Pure statistics over a session snapshot.
//!
//! Every function here takes the full list it needs, performs no I/O and
//! keeps no state between calls. Malformed records (see
//! [`FocusSession::check`]) are left out of every figure.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AggregationInputError;
use crate::session::{FocusSession, Task};

/// Focus minutes accumulated on one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFocus {
    pub task_id: i64,
    pub title: String,
    pub completed: bool,
    /// Rounded to one decimal place.
    pub minutes: f64,
}

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    pub day: NaiveDate,
    pub minutes: u64,
    pub sessions: u64,
}

/// Local calendar day of `instant`. Equal keys mean the same local date.
pub fn day_key(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Split a snapshot into usable records and the reasons others were dropped.
pub fn partition_valid(
    sessions: &[FocusSession],
) -> (Vec<&FocusSession>, Vec<AggregationInputError>) {
    let mut valid = Vec::with_capacity(sessions.len());
    let mut rejected = Vec::new();
    for session in sessions {
        match session.check() {
            Ok(()) => valid.push(session),
            Err(e) => rejected.push(e),
        }
    }
    (valid, rejected)
}

/// Well-formed focus sessions, in input order.
pub fn focus_sessions(sessions: &[FocusSession]) -> Vec<&FocusSession> {
    sessions
        .iter()
        .filter(|s| s.is_focus() && s.check().is_ok())
        .collect()
}

fn focus_on_day(sessions: &[FocusSession], day: NaiveDate) -> impl Iterator<Item = &FocusSession> {
    focus_sessions(sessions)
        .into_iter()
        .filter(move |s| day_key(s.ended_at) == day)
}

/// Rounded (half up) focus minutes on `day`.
pub fn minutes_on_day(sessions: &[FocusSession], day: NaiveDate) -> u64 {
    let seconds: i128 = focus_on_day(sessions, day)
        .map(|s| i128::from(s.duration_seconds))
        .sum();
    round_minutes(seconds)
}

pub fn session_count_on_day(sessions: &[FocusSession], day: NaiveDate) -> u64 {
    focus_on_day(sessions, day).count() as u64
}

/// Consecutive days ending at `today` with at least one focus session.
/// Zero when `today` itself has none.
pub fn current_streak_days(sessions: &[FocusSession], today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = focus_sessions(sessions)
        .into_iter()
        .map(|s| day_key(s.ended_at))
        .collect();

    let mut streak = 0;
    let mut day = Some(today);
    while let Some(d) = day {
        if !active.contains(&d) {
            break;
        }
        streak += 1;
        day = d.checked_sub_days(Days::new(1));
    }
    streak
}

/// Tasks ranked by focus minutes, highest first.
///
/// Sessions without a task, or pointing at a task not in `tasks`, are left
/// out. Ties keep the order of `tasks`. Entries that round to zero minutes
/// are dropped before truncating to `limit`.
pub fn top_tasks_by_focus_minutes(
    sessions: &[FocusSession],
    tasks: &[Task],
    limit: usize,
) -> Vec<TaskFocus> {
    let mut seconds_by_task: HashMap<i64, i128> = HashMap::new();
    for session in focus_sessions(sessions) {
        if let Some(task_id) = session.task_id {
            *seconds_by_task.entry(task_id).or_default() += i128::from(session.duration_seconds);
        }
    }

    let mut ranked: Vec<TaskFocus> = tasks
        .iter()
        .filter_map(|task| {
            let seconds = *seconds_by_task.get(&task.id)?;
            let minutes = round_one_decimal(seconds as f64 / 60.0);
            (minutes > 0.0).then(|| TaskFocus {
                task_id: task.id,
                title: task.title.clone(),
                completed: task.completed,
                minutes,
            })
        })
        .collect();

    // Stable: equal minutes keep task order.
    ranked.sort_by(|a, b| b.minutes.total_cmp(&a.minutes));
    ranked.truncate(limit);
    ranked
}

/// Per-day totals for the `days` days ending at `today`, oldest first.
pub fn recent_days(sessions: &[FocusSession], today: NaiveDate, days: u32) -> Vec<DayTotal> {
    let mut seconds: HashMap<NaiveDate, (i128, u64)> = HashMap::new();
    for session in focus_sessions(sessions) {
        let entry = seconds.entry(day_key(session.ended_at)).or_default();
        entry.0 += i128::from(session.duration_seconds);
        entry.1 += 1;
    }

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|day| {
            let (secs, count) = seconds.get(&day).copied().unwrap_or_default();
            DayTotal {
                day,
                minutes: round_minutes(secs),
                sessions: count,
            }
        })
        .collect()
}

// Sums are taken in i128: any number of valid i64 durations fits.
fn round_minutes(seconds: i128) -> u64 {
    u64::try_from((seconds.max(0) + 30) / 60).unwrap_or(u64::MAX)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Mode;
    use chrono::{Duration, TimeZone};

    fn local_noon(day: NaiveDate) -> DateTime<Utc> {
        Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn focus(on: NaiveDate, secs: i64, task_id: Option<i64>) -> FocusSession {
        FocusSession::new(task_id, Mode::Focus, secs, local_noon(on))
    }

    fn brk(on: NaiveDate, secs: i64) -> FocusSession {
        FocusSession::new(None, Mode::Break, secs, local_noon(on))
    }

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.into(),
            completed: false,
        }
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let today = day(2024, 5, 10);
        assert_eq!(minutes_on_day(&[], today), 0);
        assert_eq!(session_count_on_day(&[], today), 0);
        assert_eq!(current_streak_days(&[], today), 0);
        assert!(top_tasks_by_focus_minutes(&[], &[task(1, "a")], 5).is_empty());
    }

    #[test]
    fn day_key_groups_same_local_day() {
        let d = day(2024, 5, 10);
        let morning = Local
            .from_local_datetime(&d.and_hms_opt(0, 30, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        let night = Local
            .from_local_datetime(&d.and_hms_opt(23, 30, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(day_key(morning), day_key(night));
        assert_ne!(day_key(night), day_key(night + Duration::hours(1)));
    }

    #[test]
    fn break_sessions_do_not_count() {
        let today = day(2024, 5, 10);
        let sessions = vec![brk(today, 300), focus(today, 1500, None)];
        assert_eq!(focus_sessions(&sessions).len(), 1);
        assert_eq!(minutes_on_day(&sessions, today), 25);
        assert_eq!(session_count_on_day(&sessions, today), 1);
    }

    #[test]
    fn minutes_round_half_up() {
        let today = day(2024, 5, 10);
        assert_eq!(minutes_on_day(&[focus(today, 90, None)], today), 2);
        assert_eq!(minutes_on_day(&[focus(today, 89, None)], today), 1);
        assert_eq!(minutes_on_day(&[focus(today, 29, None)], today), 0);
    }

    #[test]
    fn other_days_excluded() {
        let today = day(2024, 5, 10);
        let sessions = vec![focus(day(2024, 5, 9), 1500, None)];
        assert_eq!(minutes_on_day(&sessions, today), 0);
        assert_eq!(session_count_on_day(&sessions, today), 0);
    }

    #[test]
    fn streak_counts_run_ending_today() {
        let today = day(2024, 5, 10);
        let sessions = vec![
            focus(day(2024, 5, 10), 60, None),
            focus(day(2024, 5, 9), 60, None),
            focus(day(2024, 5, 8), 60, None),
            // gap on the 7th
            focus(day(2024, 5, 6), 60, None),
        ];
        assert_eq!(current_streak_days(&sessions, today), 3);
    }

    #[test]
    fn streak_zero_without_session_today() {
        let today = day(2024, 5, 10);
        let sessions = vec![focus(day(2024, 5, 9), 60, None), brk(today, 300)];
        assert_eq!(current_streak_days(&sessions, today), 0);
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let today = day(2024, 3, 1);
        let sessions = vec![
            focus(day(2024, 3, 1), 60, None),
            focus(day(2024, 2, 29), 60, None),
            focus(day(2024, 2, 28), 60, None),
        ];
        assert_eq!(current_streak_days(&sessions, today), 3);
    }

    #[test]
    fn ranking_sorts_filters_and_truncates() {
        let today = day(2024, 5, 10);
        let tasks = vec![task(1, "a"), task(2, "b"), task(3, "c"), task(4, "d")];
        let sessions = vec![
            focus(today, 600, Some(1)),
            focus(today, 1200, Some(2)),
            focus(today, 600, Some(3)),
            focus(today, 2, Some(4)),     // rounds to 0.0
            focus(today, 3000, Some(99)), // unknown task
            focus(today, 3000, None),
        ];

        let ranked = top_tasks_by_focus_minutes(&sessions, &tasks, 5);
        let ids: Vec<i64> = ranked.iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(ranked[0].minutes, 20.0);

        let top2 = top_tasks_by_focus_minutes(&sessions, &tasks, 2);
        assert_eq!(top2.iter().map(|t| t.task_id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn ranking_rounds_to_one_decimal() {
        let today = day(2024, 5, 10);
        let ranked = top_tasks_by_focus_minutes(&[focus(today, 100, Some(1))], &[task(1, "a")], 5);
        assert_eq!(ranked[0].minutes, 1.7);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let today = day(2024, 5, 10);
        let mut broken = focus(today, 1500, Some(1));
        broken.duration_seconds = -10;
        let mut nameless = focus(today, 1500, Some(1));
        nameless.id.clear();
        let sessions = vec![broken, nameless, focus(today, 600, Some(1))];

        let (valid, rejected) = partition_valid(&sessions);
        assert_eq!(valid.len(), 1);
        assert_eq!(rejected.len(), 2);
        assert_eq!(minutes_on_day(&sessions, today), 10);
        assert_eq!(session_count_on_day(&sessions, today), 1);
        assert_eq!(
            top_tasks_by_focus_minutes(&sessions, &[task(1, "a")], 5)[0].minutes,
            10.0
        );
    }

    #[test]
    fn recent_days_oldest_first_with_gaps() {
        let today = day(2024, 5, 10);
        let sessions = vec![focus(today, 1500, None), focus(day(2024, 5, 8), 600, None)];
        let totals = recent_days(&sessions, today, 3);
        assert_eq!(
            totals,
            vec![
                DayTotal {
                    day: day(2024, 5, 8),
                    minutes: 10,
                    sessions: 1,
                },
                DayTotal {
                    day: day(2024, 5, 9),
                    minutes: 0,
                    sessions: 0,
                },
                DayTotal {
                    day: today,
                    minutes: 25,
                    sessions: 1,
                },
            ]
        );
    }

    #[test]
    fn huge_durations_do_not_overflow() {
        let today = day(2024, 5, 10);
        let half = i64::MAX / 2 + 1;
        let sessions = vec![focus(today, half, Some(1)), focus(today, half, Some(1))];
        assert_eq!(partition_valid(&sessions).1.len(), 0);

        let expected = ((i128::from(half) * 2 + 30) / 60) as u64;
        assert_eq!(minutes_on_day(&sessions, today), expected);
        assert_eq!(recent_days(&sessions, today, 1)[0].minutes, expected);

        let ranked = top_tasks_by_focus_minutes(&sessions, &[task(1, "a")], 5);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].minutes > 0.0);
    }
}
