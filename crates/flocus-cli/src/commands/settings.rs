use clap::Subcommand;
use flocus_core::{DurationConfig, Phase};
use serde_json::json;

use super::{load_controller, print_json};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show phase durations in minutes
    Show,
    /// Change phase durations (minutes; out-of-range values are clamped)
    Set {
        /// Focus length, 1-120
        #[arg(long)]
        focus: Option<String>,
        /// Short break length, 1-30
        #[arg(long)]
        short_break: Option<String>,
        /// Long break length, 5-60
        #[arg(long)]
        long_break: Option<String>,
    },
    /// Restore 25/5/15
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = load_controller()?;

    match action {
        SettingsAction::Show => {
            let d = controller.durations();
            print_json(&json!({
                "focus": d.minutes(Phase::Focus),
                "shortBreak": d.minutes(Phase::ShortBreak),
                "longBreak": d.minutes(Phase::LongBreak),
            }))?;
        }
        SettingsAction::Set {
            focus,
            short_break,
            long_break,
        } => {
            let current = *controller.durations();
            let keep = |phase: Phase| current.minutes(phase).to_string();
            let durations = DurationConfig::from_minute_inputs(
                &focus.unwrap_or_else(|| keep(Phase::Focus)),
                &short_break.unwrap_or_else(|| keep(Phase::ShortBreak)),
                &long_break.unwrap_or_else(|| keep(Phase::LongBreak)),
            );
            print_json(&controller.save_settings(durations))?;
        }
        SettingsAction::Reset => {
            print_json(&controller.save_settings(DurationConfig::default()))?;
        }
    }
    Ok(())
}
