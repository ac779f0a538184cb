//! Timer controller.
//!
//! Owns the one `TimerState`, the active `DurationConfig` and the session
//! ledger. Every user action and every tick goes through here; the new state
//! is persisted before the action returns. Storage failures are logged and
//! never interrupt the timer.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::events::Event;
use crate::ledger::{SessionLedger, TodoItem};
use crate::storage::{Gateway, KvStore, SessionCount, Streak};
use crate::timer::{ClockStatus, DurationConfig, Phase, TimerState, Transition};

pub struct Controller<S> {
    state: TimerState,
    durations: DurationConfig,
    ledger: SessionLedger,
    gateway: Gateway<S>,
}

impl<S: KvStore> Controller<S> {
    /// Restore from storage. Each key is read on its own and falls back to
    /// its default if missing or unreadable.
    pub fn load(store: S) -> Self {
        let gateway = Gateway::new(store);
        let durations = gateway.load::<DurationConfig>();
        let phase = gateway.load::<Phase>();
        let SessionCount(session_index) = gateway.load::<SessionCount>();
        let Streak(streak) = gateway.load::<Streak>();
        let ledger = gateway.load::<SessionLedger>();

        let state = TimerState::restore(phase, session_index, streak, &durations);
        debug!(
            phase = %state.phase(),
            session_index = state.session_index(),
            streak = state.streak(),
            "controller restored"
        );
        Self {
            state,
            durations,
            ledger,
            gateway,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn durations(&self) -> &DurationConfig {
        &self.durations
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }

    pub fn focus_running(&self) -> bool {
        self.state.focus_running()
    }

    pub fn snapshot(&self) -> Event {
        Event::snapshot(&self.state)
    }

    // ── Timer actions ────────────────────────────────────────────────

    /// Start or resume. `None` if already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running() {
            return None;
        }
        Some(self.toggle())
    }

    /// Pause. `None` if not running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running() {
            return None;
        }
        Some(self.toggle())
    }

    /// The start/pause button.
    pub fn toggle(&mut self) -> Event {
        self.state = self.state.toggle();
        self.persist_timer();
        let at = Utc::now();
        if self.state.is_running() {
            debug!(phase = %self.state.phase(), remaining = self.state.remaining_secs(), "timer started");
            Event::TimerStarted {
                phase: self.state.phase(),
                remaining_secs: self.state.remaining_secs(),
                at,
            }
        } else {
            debug!(phase = %self.state.phase(), remaining = self.state.remaining_secs(), "timer paused");
            Event::TimerPaused {
                phase: self.state.phase(),
                remaining_secs: self.state.remaining_secs(),
                at,
            }
        }
    }

    pub fn reset(&mut self) -> Event {
        self.state = self.state.reset(&self.durations);
        self.persist_timer();
        Event::TimerReset {
            phase: self.state.phase(),
            remaining_secs: self.state.remaining_secs(),
            at: Utc::now(),
        }
    }

    pub fn skip(&mut self) -> Event {
        let from = self.state.phase();
        let (next, transition) = self.state.skip(&self.durations);
        self.state = next;
        self.complete(from, transition, true)
    }

    /// Deliver one elapsed second. Returns `PhaseCompleted` when the phase
    /// ran out.
    pub fn tick(&mut self) -> Option<Event> {
        let from = self.state.phase();
        let (next, transition) = self.state.tick(&self.durations);
        self.state = next;
        transition.map(|t| self.complete(from, t, false))
    }

    /// Replace the whole duration table.
    pub fn save_settings(&mut self, durations: DurationConfig) -> Event {
        let durations = durations.clamped();
        let applied_now = self.state.status() == ClockStatus::Idle;
        self.durations = durations;
        self.state = self.state.apply_durations(&durations);
        self.persist_timer();
        info!(
            focus = durations.get(Phase::Focus),
            short_break = durations.get(Phase::ShortBreak),
            long_break = durations.get(Phase::LongBreak),
            applied_now,
            "settings saved"
        );
        Event::SettingsSaved {
            durations,
            applied_now,
            at: Utc::now(),
        }
    }

    /// Wipe all progress: default timer state, empty ledger, progress keys
    /// deleted. Durations are kept.
    pub fn reset_all_progress(&mut self) -> Event {
        self.state = TimerState::fresh(&self.durations);
        self.ledger.clear();
        if let Err(err) = self.gateway.clear_progress() {
            warn!(error = %err, "progress keys not fully cleared");
        }
        info!("all progress reset");
        Event::ProgressReset { at: Utc::now() }
    }

    // ── Ledger actions ───────────────────────────────────────────────

    pub fn add_todo(&mut self, session_number: u32, text: &str) -> Option<TodoItem> {
        let item = self
            .ledger
            .add_todo(session_number, text, Utc::now())
            .cloned()?;
        self.persist_ledger();
        Some(item)
    }

    pub fn toggle_todo(&mut self, session_number: u32, todo_id: &str) -> bool {
        let changed = self.ledger.toggle_todo(session_number, todo_id);
        if changed {
            self.persist_ledger();
        }
        changed
    }

    pub fn delete_todo(&mut self, session_number: u32, todo_id: &str) -> bool {
        let changed = self.ledger.delete_todo(session_number, todo_id);
        if changed {
            self.persist_ledger();
        }
        changed
    }

    pub fn complete_session(&mut self, session_number: u32) -> bool {
        let changed = self.ledger.complete_session(session_number);
        if changed {
            self.persist_ledger();
        }
        changed
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, from: Phase, transition: Transition, skipped: bool) -> Event {
        if transition.clear_ledger {
            self.ledger.clear();
            self.persist_ledger();
        }
        self.persist_timer();
        info!(
            from = %from,
            to = %transition.next_phase,
            session_index = self.state.session_index(),
            streak = self.state.streak(),
            skipped,
            "phase completed"
        );
        Event::PhaseCompleted {
            from,
            to: transition.next_phase,
            session_index: self.state.session_index(),
            streak: self.state.streak(),
            ledger_cleared: transition.clear_ledger,
            skipped,
            at: Utc::now(),
        }
    }

    fn persist_timer(&self) {
        self.gateway.save_or_warn(&Streak(self.state.streak()));
        self.gateway
            .save_or_warn(&SessionCount(self.state.session_index()));
        self.gateway.save_or_warn(&self.state.phase());
        self.gateway.save_or_warn(&self.durations);
    }

    fn persist_ledger(&self) {
        self.gateway.save_or_warn(&self.ledger);
    }
}
