mod config;
pub mod database;
pub mod keys;

pub use config::{Config, QuoteConfig, TimerConfig};
pub use database::Database;
pub use keys::{Gateway, SessionCount, StoredValue, Streak};

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// Durable string key/value storage.
///
/// Each call must be atomic on its own; nothing spans several keys.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Returns the data directory, creating it if needed.
///
/// `FLOCUS_DATA_DIR` wins when set. Otherwise `~/.config/flocus`, or
/// `~/.config/flocus-dev` with `FLOCUS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FLOCUS_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FLOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("flocus-dev")
            } else {
                base_dir.join("flocus")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
