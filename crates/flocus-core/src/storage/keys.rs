//! Typed accessors for the persisted keys.
//!
//! Each key has its own codec and its own default, so a corrupt value only
//! ever costs that one key.
//!
//! | key            | value                                  |
//! |----------------|----------------------------------------|
//! | `streak`       | integer as string                      |
//! | `sessions`     | session index as string                |
//! | `timer-type`   | `focus` / `shortBreak` / `longBreak`   |
//! | `timer-config` | JSON `{focus, shortBreak, longBreak}`  |
//! | `session-data` | JSON session ledger                    |

use tracing::{debug, warn};

use super::KvStore;
use crate::error::StorageError;
use crate::ledger::SessionLedger;
use crate::timer::{DurationConfig, Phase, SESSIONS_PER_CYCLE};

/// A value stored under one fixed key.
pub trait StoredValue: Sized {
    const KEY: &'static str;

    fn encode(&self) -> Result<String, StorageError>;
    fn decode(raw: &str) -> Result<Self, StorageError>;
    fn default_value() -> Self;
}

/// Completed cycles since the last full reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streak(pub u32);

/// Session index within the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCount(pub u32);

/// Keys wiped by a full progress reset. `timer-config` is a setting, not
/// progress, and survives.
pub const PROGRESS_KEYS: [&str; 4] = [
    Streak::KEY,
    SessionCount::KEY,
    <Phase as StoredValue>::KEY,
    <SessionLedger as StoredValue>::KEY,
];

fn corrupt(key: &str, message: impl ToString) -> StorageError {
    StorageError::Corrupt {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn encode_json<T: serde::Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl StoredValue for Streak {
    const KEY: &'static str = "streak";

    fn encode(&self) -> Result<String, StorageError> {
        Ok(self.0.to_string())
    }

    fn decode(raw: &str) -> Result<Self, StorageError> {
        raw.trim()
            .parse::<u32>()
            .map(Streak)
            .map_err(|e| corrupt(Self::KEY, e))
    }

    fn default_value() -> Self {
        Streak(0)
    }
}

impl StoredValue for SessionCount {
    const KEY: &'static str = "sessions";

    fn encode(&self) -> Result<String, StorageError> {
        Ok(self.0.to_string())
    }

    fn decode(raw: &str) -> Result<Self, StorageError> {
        let n = raw
            .trim()
            .parse::<u32>()
            .map_err(|e| corrupt(Self::KEY, e))?;
        if n > SESSIONS_PER_CYCLE {
            return Err(corrupt(Self::KEY, format!("{n} is outside 0..={SESSIONS_PER_CYCLE}")));
        }
        Ok(SessionCount(n))
    }

    fn default_value() -> Self {
        SessionCount(0)
    }
}

impl StoredValue for Phase {
    const KEY: &'static str = "timer-type";

    fn encode(&self) -> Result<String, StorageError> {
        Ok(self.as_str().to_string())
    }

    fn decode(raw: &str) -> Result<Self, StorageError> {
        // Tolerate a JSON-quoted name.
        raw.trim()
            .trim_matches('"')
            .parse::<Phase>()
            .map_err(|e| corrupt(Self::KEY, e))
    }

    fn default_value() -> Self {
        Phase::Focus
    }
}

impl StoredValue for DurationConfig {
    const KEY: &'static str = "timer-config";

    fn encode(&self) -> Result<String, StorageError> {
        encode_json(Self::KEY, self)
    }

    fn decode(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str::<DurationConfig>(raw)
            .map(DurationConfig::clamped)
            .map_err(|e| corrupt(Self::KEY, e))
    }

    fn default_value() -> Self {
        DurationConfig::default()
    }
}

impl StoredValue for SessionLedger {
    const KEY: &'static str = "session-data";

    fn encode(&self) -> Result<String, StorageError> {
        encode_json(Self::KEY, self)
    }

    fn decode(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| corrupt(Self::KEY, e))
    }

    fn default_value() -> Self {
        SessionLedger::new()
    }
}

/// Persistence gateway over any [`KvStore`].
pub struct Gateway<S> {
    store: S,
}

impl<S: KvStore> Gateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read and decode one key. `Ok(None)` when the key is absent.
    pub fn try_load<T: StoredValue>(&self) -> Result<Option<T>, StorageError> {
        match self.store.get(T::KEY)? {
            Some(raw) => T::decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Read one key, falling back to its default when absent or unreadable.
    pub fn load<T: StoredValue>(&self) -> T {
        match self.try_load::<T>() {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key = T::KEY, "key absent, using default");
                T::default_value()
            }
            Err(err) => {
                warn!(key = T::KEY, error = %err, "unreadable key, using default");
                T::default_value()
            }
        }
    }

    pub fn save<T: StoredValue>(&self, value: &T) -> Result<(), StorageError> {
        let raw = value.encode()?;
        self.store.set(T::KEY, &raw)
    }

    /// Best-effort save: failures are logged and swallowed.
    pub fn save_or_warn<T: StoredValue>(&self, value: &T) {
        if let Err(err) = self.save(value) {
            warn!(key = T::KEY, error = %err, "failed to persist key");
        }
    }

    /// Delete every progress key. Keeps going past individual failures and
    /// reports the first one.
    pub fn clear_progress(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in PROGRESS_KEYS {
            if let Err(err) = self.store.remove(key) {
                warn!(key, error = %err, "failed to delete key");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
