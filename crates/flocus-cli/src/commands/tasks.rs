use clap::Subcommand;

use super::{load_controller, print_json};

#[derive(Subcommand)]
pub enum TasksAction {
    /// List tasks as JSON
    List {
        /// Only this session (1-4)
        #[arg(long)]
        session: Option<u32>,
    },
    /// Add a task
    Add {
        /// Task text
        text: String,
        /// Session number (1-4), defaults to the current session
        #[arg(long)]
        session: Option<u32>,
    },
    /// Flip a task's completed flag
    Toggle {
        /// Session number (1-4)
        session: u32,
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Session number (1-4)
        session: u32,
        /// Task ID
        id: String,
    },
    /// Mark a session as completed
    Complete {
        /// Session number (1-4)
        session: u32,
    },
}

pub fn run(action: TasksAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = load_controller()?;

    match action {
        TasksAction::List { session: None } => {
            print_json(controller.ledger())?;
        }
        TasksAction::List {
            session: Some(session),
        } => match controller.ledger().session(session) {
            Some(entry) => print_json(entry)?,
            None => println!("[]"),
        },
        TasksAction::Add { text, session } => {
            let session = session.unwrap_or_else(|| controller.state().current_session());
            let item = controller
                .add_todo(session, &text)
                .ok_or("task text must not be blank and session must be 1-4")?;
            print_json(&item)?;
        }
        TasksAction::Toggle { session, id } => {
            if !controller.toggle_todo(session, &id) {
                return Err(format!("task not found: {id}").into());
            }
            println!("ok");
        }
        TasksAction::Delete { session, id } => {
            if !controller.delete_todo(session, &id) {
                return Err(format!("task not found: {id}").into());
            }
            println!("ok");
        }
        TasksAction::Complete { session } => {
            if !controller.complete_session(session) {
                return Err(format!("session {session} has no tasks").into());
            }
            println!("ok");
        }
    }
    Ok(())
}
