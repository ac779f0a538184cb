pub mod config;
pub mod progress;
pub mod quote;
pub mod settings;
pub mod tasks;
pub mod timer;

use flocus_core::{Controller, Database};

/// Open the default database and restore the controller from it.
pub fn load_controller() -> Result<Controller<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(Controller::load(db))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
