use clap::Subcommand;
use serde_json::json;

use super::{load_controller, print_json};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show streak and position in the cycle
    Show,
    /// Wipe streak, session progress, phase and tasks (durations are kept)
    Reset,
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = load_controller()?;

    match action {
        ProgressAction::Show => {
            let s = controller.state();
            print_json(&json!({
                "streak": s.streak(),
                "sessionIndex": s.session_index(),
                "currentSession": s.current_session(),
                "phase": s.phase(),
            }))?;
        }
        ProgressAction::Reset => {
            print_json(&controller.reset_all_progress())?;
        }
    }
    Ok(())
}
