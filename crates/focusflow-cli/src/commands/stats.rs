use chrono::Utc;
use clap::Subcommand;
use focusflow_core::stats::{current_streak_days, day_key, minutes_on_day, session_count_on_day};
use focusflow_core::{Config, DashboardSummary, Database, SessionStore, TaskStore};
use serde::Serialize;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's focus totals and streak
    Today,
    /// Full dashboard: today, streak, top tasks, last 7 days
    Dashboard {
        /// How many tasks to rank (defaults to dashboard.top_tasks_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Serialize)]
struct TodayStats {
    minutes: u64,
    sessions: u64,
    streak_days: u32,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let sessions = SessionStore::list_all(&db)?;
    let now = Utc::now();

    match action {
        StatsAction::Today => {
            let today = day_key(now);
            let stats = TodayStats {
                minutes: minutes_on_day(&sessions, today),
                sessions: session_count_on_day(&sessions, today),
                streak_days: current_streak_days(&sessions, today),
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Dashboard { limit } => {
            let limit = match limit {
                Some(limit) => limit,
                None => Config::load()?.dashboard.top_tasks_limit as usize,
            };
            let tasks = TaskStore::list_all(&db)?;
            let summary = DashboardSummary::compute(&sessions, &tasks, now, limit);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
