use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{ClockStatus, DurationConfig, Phase, TimerState};

/// Every state change in the system produces an Event.
/// Front ends render from `StateSnapshot` and may react to the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase ended, by running out or by being skipped.
    PhaseCompleted {
        from: Phase,
        to: Phase,
        session_index: u32,
        streak: u32,
        ledger_cleared: bool,
        skipped: bool,
        at: DateTime<Utc>,
    },
    SettingsSaved {
        durations: DurationConfig,
        /// Whether the current phase picked up the new length right away.
        applied_now: bool,
        at: DateTime<Utc>,
    },
    ProgressReset {
        at: DateTime<Utc>,
    },
    LedgerChanged {
        session_number: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: ClockStatus,
        phase: Phase,
        phase_label: String,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        session_index: u32,
        current_session: u32,
        streak: u32,
        focus_running: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Build a full state snapshot event.
    pub fn snapshot(state: &TimerState) -> Self {
        Event::StateSnapshot {
            status: state.status(),
            phase: state.phase(),
            phase_label: state.phase().label().to_string(),
            remaining_secs: state.remaining_secs(),
            total_secs: state.phase_total_secs(),
            progress_pct: state.progress_pct(),
            session_index: state.session_index(),
            current_session: state.current_session(),
            streak: state.streak(),
            focus_running: state.focus_running(),
            at: Utc::now(),
        }
    }
}
