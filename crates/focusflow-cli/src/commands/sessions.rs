use clap::Subcommand;
use focusflow_core::{Database, SessionStore};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// Print every recorded session as JSON
    List,
    /// Delete every recorded session
    Clear,
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SessionsAction::List => {
            let sessions = SessionStore::list_all(&db)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        SessionsAction::Clear => {
            db.clear_all()?;
            println!("sessions cleared");
        }
    }
    Ok(())
}
