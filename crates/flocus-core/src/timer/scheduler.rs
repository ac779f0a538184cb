//! Phase scheduling.
//!
//! `advance` is the only place that decides what follows a finished phase.
//! Natural expiry and skip both route through it.

use super::phase::Phase;

/// Number of focus sessions that make up one cycle.
pub const SESSIONS_PER_CYCLE: u32 = 4;

/// Outcome of finishing a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next_phase: Phase,
    pub next_session_index: u32,
    pub streak_delta: u32,
    pub clear_ledger: bool,
}

/// Compute what follows `phase` given the current session index.
///
/// After the fourth focus the index reads `4` for the duration of the long
/// break; completing the long break brings it back to `0`.
pub fn advance(phase: Phase, session_index: u32) -> Transition {
    match phase {
        Phase::Focus => {
            let next = session_index + 1;
            let next_phase = if next % SESSIONS_PER_CYCLE == 0 {
                Phase::LongBreak
            } else {
                Phase::ShortBreak
            };
            Transition {
                next_phase,
                next_session_index: next,
                streak_delta: 0,
                clear_ledger: false,
            }
        }
        Phase::ShortBreak => Transition {
            next_phase: Phase::Focus,
            next_session_index: session_index,
            streak_delta: 0,
            clear_ledger: false,
        },
        Phase::LongBreak => Transition {
            next_phase: Phase::Focus,
            next_session_index: 0,
            streak_delta: 1,
            clear_ledger: true,
        },
    }
}
