//! Live focus timer.
//!
//! Runs a [`TimerDriver`] in-process, prints every state change as a JSON
//! line on stdout and reads one command per line from stdin.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use focusflow_core::timer::format_mm_ss;
use focusflow_core::{
    Config, CoreError, Database, Event, Mode, SessionWriter, TaskStore, TimerConfig, TimerDriver,
    TimerEngine, TimerHandle,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "commands: start | pause | <enter> (toggle) | reset | focus | break | \
                    status | task <id|none> | config <focus> <break> | quit";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer in the foreground
    Run {
        /// Focus minutes (1-180), defaults to timer.focus_minutes
        #[arg(long = "focus")]
        focus_minutes: Option<i64>,
        /// Break minutes (1-60), defaults to timer.break_minutes
        #[arg(long = "break")]
        break_minutes: Option<i64>,
        /// Task to credit focus sessions to (default: first open task)
        #[arg(long, conflicts_with = "no_task")]
        task: Option<i64>,
        /// Do not credit sessions to any task
        #[arg(long)]
        no_task: bool,
        /// Exit after this many completed focus cycles. Each next
        /// countdown starts on its own.
        #[arg(long)]
        cycles: Option<u32>,
        /// Start counting immediately
        #[arg(long)]
        start: bool,
        /// Tick period in milliseconds
        #[arg(long, hide = true, default_value_t = 1000)]
        tick_ms: u64,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            focus_minutes,
            break_minutes,
            task,
            no_task,
            cycles,
            start,
            tick_ms,
        } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_live(LiveOptions {
                focus_minutes,
                break_minutes,
                task,
                no_task,
                cycles,
                start,
                period: Duration::from_millis(tick_ms.max(1)),
            }))
        }
    }
}

struct LiveOptions {
    focus_minutes: Option<i64>,
    break_minutes: Option<i64>,
    task: Option<i64>,
    no_task: bool,
    cycles: Option<u32>,
    start: bool,
    period: Duration,
}

async fn run_live(opts: LiveOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let timer_config = TimerConfig::new(
        opts.focus_minutes.unwrap_or(config.timer.focus_minutes),
        opts.break_minutes.unwrap_or(config.timer.break_minutes),
    )?;

    let db = Arc::new(Database::open()?);
    let task_id = if opts.no_task {
        None
    } else {
        match opts.task {
            Some(id) => Some(id),
            None => TaskStore::list_all(db.as_ref())?
                .into_iter()
                .find(|t| !t.completed)
                .map(|t| t.id),
        }
    };

    let engine = TimerEngine::new(timer_config, SessionWriter::background(db.clone()));
    let (handle, mut events) = TimerDriver::new(engine).with_period(opts.period).spawn();
    handle.select_task(task_id).await?;
    if opts.start {
        handle.start().await?;
    }
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut focus_done: u32 = 0;
    let mut awaiting_store: u32 = 0;

    loop {
        let cycles_done = opts.cycles.is_some_and(|n| focus_done >= n);
        if awaiting_store == 0 {
            if cycles_done {
                break;
            }
            // Nothing can restart a stopped timer once stdin is gone.
            if !stdin_open && !handle.state().await?.running {
                debug!("timer stopped with stdin closed");
                break;
            }
        }

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match &event {
                    Event::Tick { mode, seconds_remaining, .. } => {
                        eprint!("\r{mode:>5} {}", format_mm_ss(*seconds_remaining));
                        continue;
                    }
                    Event::CycleCompleted { finished, session, .. } => {
                        if *finished == Mode::Focus {
                            focus_done += 1;
                        }
                        if session.is_some() {
                            awaiting_store += 1;
                        }
                        if opts.cycles.is_some_and(|n| focus_done < n) {
                            handle.start().await?;
                        }
                    }
                    Event::SessionPersisted { .. } => {
                        awaiting_store = awaiting_store.saturating_sub(1);
                    }
                    Event::PersistenceFailed { reason, .. } => {
                        awaiting_store = awaiting_store.saturating_sub(1);
                        eprintln!("\nwarning: session not saved: {reason}");
                    }
                    _ => {}
                }
                println!("{}", serde_json::to_string(&event)?);
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        match dispatch(&handle, line.trim()).await {
                            Ok(true) => {}
                            Ok(false) => break,
                            Err(e) => eprintln!("error: {e}"),
                        }
                    }
                    None => {
                        debug!("stdin closed");
                        stdin_open = false;
                    }
                }
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

/// Apply one stdin command. Returns `Ok(false)` to quit.
async fn dispatch(handle: &TimerHandle, line: &str) -> Result<bool, CoreError> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (None, ..) => {
            if handle.state().await?.running {
                handle.pause().await?;
            } else {
                handle.start().await?;
            }
        }
        (Some("start"), ..) => {
            handle.start().await?;
        }
        (Some("pause"), ..) => {
            handle.pause().await?;
        }
        (Some("reset"), ..) => {
            handle.reset().await?;
        }
        (Some("focus"), ..) => {
            handle.switch_mode(Mode::Focus).await?;
        }
        (Some("break"), ..) => {
            handle.switch_mode(Mode::Break).await?;
        }
        (Some("status"), ..) => {
            let snapshot = handle.snapshot().await?;
            println!("{}", serde_json::to_string(&snapshot)?);
        }
        (Some("task"), Some("none"), _) => {
            handle.select_task(None).await?;
        }
        (Some("task"), Some(id), _) => match id.parse::<i64>() {
            Ok(id) => {
                handle.select_task(Some(id)).await?;
            }
            Err(_) => eprintln!("task id must be a number or 'none'"),
        },
        (Some("config"), Some(focus), Some(brk)) => {
            match (focus.parse::<i64>(), brk.parse::<i64>()) {
                (Ok(focus), Ok(brk)) => {
                    handle.configure(focus, brk).await?;
                }
                _ => eprintln!("config takes two whole numbers: <focus> <break>"),
            }
        }
        (Some("quit" | "exit"), ..) => return Ok(false),
        _ => eprintln!("{HELP}"),
    }
    Ok(true)
}
