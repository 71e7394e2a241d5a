//! Task management commands for CLI.

use clap::Subcommand;
use focusflow_core::{Database, TaskStore};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
    },
    /// List tasks
    List {
        /// Only tasks not yet completed
        #[arg(long)]
        open: bool,
    },
    /// Mark a task completed
    Done {
        /// Task ID
        id: i64,
        /// Mark it open again instead
        #[arg(long)]
        undo: bool,
    },
    /// Change a task's title
    Rename {
        /// Task ID
        id: i64,
        /// New title
        title: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TaskAction::Add { title } => {
            let task = db.create_task(&title)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { open } => {
            let tasks: Vec<_> = TaskStore::list_all(&db)?
                .into_iter()
                .filter(|t| !open || !t.completed)
                .collect();
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Done { id, undo } => {
            let task = db.set_task_completed(id, !undo)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Rename { id, title } => {
            let task = db.rename_task(id, &title)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            db.delete_task(id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
