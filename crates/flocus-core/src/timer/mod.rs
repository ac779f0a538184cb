mod clock;
mod durations;
mod phase;
mod scheduler;

pub use clock::{format_clock, ClockStatus, TimerState};
pub use durations::{
    bounds, DurationBounds, DurationConfig, FOCUS_BOUNDS, LONG_BREAK_BOUNDS, SHORT_BREAK_BOUNDS,
};
pub use phase::{Phase, UnknownPhase};
pub use scheduler::{advance, Transition, SESSIONS_PER_CYCLE};
