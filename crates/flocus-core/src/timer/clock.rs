//! Phase clock.
//!
//! The clock is a plain value: every command consumes the current
//! `TimerState` and returns the next one, so the controller is the only
//! place that ever stores it. Time only moves when the caller delivers a
//! one-second `tick`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> (Expired) -> Idle
//!   any --reset--> Idle        any --skip--> (Expired) -> Idle
//! ```
//!
//! `Expired` is never observable: reaching zero (or skipping) immediately
//! hands the finished phase to [`advance`] and lands in `Idle` on the next
//! phase.

use serde::{Deserialize, Serialize};

use super::durations::DurationConfig;
use super::phase::Phase;
use super::scheduler::{advance, Transition, SESSIONS_PER_CYCLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStatus {
    /// Not running, full duration remaining.
    Idle,
    Running,
    /// Not running, part of the duration already elapsed.
    Paused,
}

/// The complete state of the timer.
///
/// Only built through [`TimerState::fresh`] and [`TimerState::restore`], so
/// the session index and remaining time always fit the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    phase: Phase,
    remaining_secs: u64,
    running: bool,
    session_index: u32,
    streak: u32,
    /// Length the current phase had when it became current. Settings changes
    /// made mid-phase do not touch it.
    phase_total_secs: u64,
}

impl TimerState {
    /// Default state: idle at the start of a focus phase, no progress.
    pub fn fresh(durations: &DurationConfig) -> Self {
        Self::restore(Phase::Focus, 0, 0, durations)
    }

    /// Rebuild from persisted values.
    ///
    /// The countdown always restarts at the full configured duration of the
    /// restored phase. A session index that cannot belong to `phase` is
    /// dropped to zero.
    pub fn restore(
        phase: Phase,
        session_index: u32,
        streak: u32,
        durations: &DurationConfig,
    ) -> Self {
        let session_index = normalize_index(phase, session_index);
        let total = durations.get(phase);
        Self {
            phase,
            remaining_secs: total,
            running: false,
            session_index,
            streak,
            phase_total_secs: total,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session_index(&self) -> u32 {
        self.session_index
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn phase_total_secs(&self) -> u64 {
        self.phase_total_secs
    }

    pub fn status(&self) -> ClockStatus {
        if self.running {
            ClockStatus::Running
        } else if self.remaining_secs == self.phase_total_secs {
            ClockStatus::Idle
        } else {
            ClockStatus::Paused
        }
    }

    /// 1-based session number shown to the user and used by the ledger.
    pub fn current_session(&self) -> u32 {
        (self.session_index + 1).min(SESSIONS_PER_CYCLE)
    }

    /// The single signal the background animation listens to.
    pub fn focus_running(&self) -> bool {
        self.running && self.phase == Phase::Focus
    }

    /// 0.0 .. 100.0 progress within the current phase.
    pub fn progress_pct(&self) -> f64 {
        if self.phase_total_secs == 0 {
            return 0.0;
        }
        let elapsed = self.phase_total_secs.saturating_sub(self.remaining_secs);
        (elapsed as f64 / self.phase_total_secs as f64 * 100.0).min(100.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(self) -> Self {
        Self {
            running: true,
            ..self
        }
    }

    pub fn pause(self) -> Self {
        Self {
            running: false,
            ..self
        }
    }

    pub fn toggle(self) -> Self {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Back to the full configured duration of the current phase.
    pub fn reset(self, durations: &DurationConfig) -> Self {
        let total = durations.get(self.phase);
        Self {
            remaining_secs: total,
            running: false,
            phase_total_secs: total,
            ..self
        }
    }

    /// Advance one second. Returns the transition when the phase expired.
    pub fn tick(self, durations: &DurationConfig) -> (Self, Option<Transition>) {
        if !self.running {
            return (self, None);
        }
        if self.remaining_secs > 1 {
            let next = Self {
                remaining_secs: self.remaining_secs - 1,
                ..self
            };
            return (next, None);
        }
        let (next, transition) = self.expire(durations);
        (next, Some(transition))
    }

    /// End the current phase now, exactly as if it had run out.
    pub fn skip(self, durations: &DurationConfig) -> (Self, Transition) {
        self.expire(durations)
    }

    /// Take a new duration table into account.
    ///
    /// Only an untouched idle phase picks up its new length right away; a
    /// phase under way keeps the length it started with.
    pub fn apply_durations(self, durations: &DurationConfig) -> Self {
        if self.status() != ClockStatus::Idle {
            return self;
        }
        let total = durations.get(self.phase);
        Self {
            remaining_secs: total,
            phase_total_secs: total,
            ..self
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(self, durations: &DurationConfig) -> (Self, Transition) {
        let transition = advance(self.phase, self.session_index);
        let total = durations.get(transition.next_phase);
        let next = Self {
            phase: transition.next_phase,
            remaining_secs: total,
            running: false,
            session_index: transition.next_session_index,
            streak: self.streak.saturating_add(transition.streak_delta),
            phase_total_secs: total,
        };
        (next, transition)
    }
}

fn normalize_index(phase: Phase, session_index: u32) -> u32 {
    match phase {
        Phase::LongBreak if session_index <= SESSIONS_PER_CYCLE => session_index,
        _ if session_index < SESSIONS_PER_CYCLE => session_index,
        _ => 0,
    }
}

/// Render seconds as `mm:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
