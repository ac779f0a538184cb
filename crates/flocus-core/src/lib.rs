//! # Flocus Core Library
//!
//! Core logic for the Flocus Pomodoro timer: a focus/short-break/long-break
//! cycle with a completed-cycle streak, per-session task lists and a
//! motivational quote fetched when a focus session ends. The `flocus` CLI is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: A value-type state machine. The caller delivers one `tick()`
//!   per elapsed second; phase transitions come from a single scheduler
//! - **Controller**: Owns the timer, durations and session ledger, and
//!   persists every change
//! - **Driver**: Async task that delivers ticks and serializes commands
//! - **Storage**: SQLite key/value persistence and TOML configuration
//! - **Quote**: HTTP client with local fallback quotes
//!
//! ## Key Components
//!
//! - [`TimerState`]: Timer state machine
//! - [`Controller`]: Action entry point
//! - [`Database`]: Key/value persistence
//! - [`Config`]: Application configuration management

pub mod timer;
pub mod ledger;
pub mod storage;
pub mod events;
pub mod controller;
pub mod driver;
pub mod quote;
pub mod error;

pub use timer::{ClockStatus, DurationConfig, Phase, TimerState};
pub use ledger::{SessionEntry, SessionLedger, TodoItem};
pub use storage::{Config, Database, KvStore};
pub use events::Event;
pub use controller::Controller;
pub use driver::DriverHandle;
pub use quote::{Quote, QuoteClient};
pub use error::{CoreError, ConfigError, DriverError, QuoteError, StorageError};
