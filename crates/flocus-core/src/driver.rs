//! Live tick driver.
//!
//! Runs the controller inside one task. User commands and ticks are handled
//! strictly one after another by a single `select!` loop, and at most one
//! tick is ever pending. Pause, reset, skip and progress reset drop the
//! pending tick before they apply; a tick is armed again only while the
//! timer is running.
//!
//! ## Usage
//!
//! ```ignore
//! let (handle, task) = driver::spawn(controller, Duration::from_secs(1));
//! handle.toggle().await?;
//! let mut state = handle.watch_state();
//! state.changed().await?;
//! ```

use std::pin::Pin;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant, Sleep};
use tracing::{debug, trace};

use crate::controller::Controller;
use crate::error::DriverError;
use crate::events::Event;
use crate::ledger::TodoItem;
use crate::storage::KvStore;
use crate::timer::{DurationConfig, TimerState};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

enum Command {
    Toggle(oneshot::Sender<Event>),
    Start(oneshot::Sender<Option<Event>>),
    Pause(oneshot::Sender<Option<Event>>),
    Reset(oneshot::Sender<Event>),
    Skip(oneshot::Sender<Event>),
    SaveSettings(DurationConfig, oneshot::Sender<Event>),
    ResetAllProgress(oneshot::Sender<Event>),
    AddTodo(u32, String, oneshot::Sender<Option<TodoItem>>),
    ToggleTodo(u32, String, oneshot::Sender<bool>),
    DeleteTodo(u32, String, oneshot::Sender<bool>),
    CompleteSession(u32, oneshot::Sender<bool>),
    Snapshot(oneshot::Sender<Event>),
    Shutdown,
}

impl Command {
    /// Commands that must not race a pending tick.
    fn interrupts_tick(&self) -> bool {
        matches!(
            self,
            Command::Toggle(_)
                | Command::Pause(_)
                | Command::Reset(_)
                | Command::Skip(_)
                | Command::ResetAllProgress(_)
        )
    }
}

/// Cloneable handle to a running driver.
#[derive(Clone)]
pub struct DriverHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<TimerState>,
    focus: watch::Receiver<bool>,
    events: broadcast::Sender<Event>,
}

impl DriverHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, DriverError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| DriverError::Closed)?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    pub async fn toggle(&self) -> Result<Event, DriverError> {
        self.request(Command::Toggle).await
    }

    pub async fn start(&self) -> Result<Option<Event>, DriverError> {
        self.request(Command::Start).await
    }

    pub async fn pause(&self) -> Result<Option<Event>, DriverError> {
        self.request(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<Event, DriverError> {
        self.request(Command::Reset).await
    }

    pub async fn skip(&self) -> Result<Event, DriverError> {
        self.request(Command::Skip).await
    }

    pub async fn save_settings(&self, durations: DurationConfig) -> Result<Event, DriverError> {
        self.request(|tx| Command::SaveSettings(durations, tx)).await
    }

    pub async fn reset_all_progress(&self) -> Result<Event, DriverError> {
        self.request(Command::ResetAllProgress).await
    }

    pub async fn add_todo(
        &self,
        session_number: u32,
        text: impl Into<String>,
    ) -> Result<Option<TodoItem>, DriverError> {
        let text = text.into();
        self.request(|tx| Command::AddTodo(session_number, text, tx))
            .await
    }

    pub async fn toggle_todo(
        &self,
        session_number: u32,
        todo_id: impl Into<String>,
    ) -> Result<bool, DriverError> {
        let id = todo_id.into();
        self.request(|tx| Command::ToggleTodo(session_number, id, tx))
            .await
    }

    pub async fn delete_todo(
        &self,
        session_number: u32,
        todo_id: impl Into<String>,
    ) -> Result<bool, DriverError> {
        let id = todo_id.into();
        self.request(|tx| Command::DeleteTodo(session_number, id, tx))
            .await
    }

    pub async fn complete_session(&self, session_number: u32) -> Result<bool, DriverError> {
        self.request(|tx| Command::CompleteSession(session_number, tx))
            .await
    }

    pub async fn snapshot(&self) -> Result<Event, DriverError> {
        self.request(Command::Snapshot).await
    }

    /// Ask the driver to stop. The join handle then yields the controller.
    pub async fn shutdown(&self) -> Result<(), DriverError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| DriverError::Closed)
    }

    /// Latest timer state, updated after every tick and command.
    pub fn watch_state(&self) -> watch::Receiver<TimerState> {
        self.state.clone()
    }

    /// "Focus phase is actively running", for the background animation.
    pub fn focus_signal(&self) -> watch::Receiver<bool> {
        self.focus.clone()
    }

    /// Every event the driver produces, including tick-driven completions.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

/// Spawn the driver on the current tokio runtime.
///
/// The task ends when [`DriverHandle::shutdown`] is called or every handle
/// is dropped, and hands the controller back.
pub fn spawn<S>(
    controller: Controller<S>,
    tick: Duration,
) -> (DriverHandle, JoinHandle<Controller<S>>)
where
    S: KvStore + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (state_tx, state_rx) = watch::channel(*controller.state());
    let (focus_tx, focus_rx) = watch::channel(controller.focus_running());
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let handle = DriverHandle {
        commands: cmd_tx,
        state: state_rx,
        focus: focus_rx,
        events: event_tx.clone(),
    };
    let driver = Driver {
        controller,
        tick,
        pending: None,
        state_tx,
        focus_tx,
        event_tx,
    };
    let task = tokio::spawn(driver.run(cmd_rx));
    (handle, task)
}

struct PendingTick {
    sleep: Pin<Box<Sleep>>,
    deadline: Instant,
}

struct Driver<S> {
    controller: Controller<S>,
    tick: Duration,
    /// The one outstanding tick, if any.
    pending: Option<PendingTick>,
    state_tx: watch::Sender<TimerState>,
    focus_tx: watch::Sender<bool>,
    event_tx: broadcast::Sender<Event>,
}

impl<S: KvStore> Driver<S> {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Controller<S> {
        self.arm(Instant::now());
        loop {
            tokio::select! {
                biased;
                cmd = commands.recv() => {
                    let Some(cmd) = cmd else { break };
                    if matches!(cmd, Command::Shutdown) {
                        break;
                    }
                    self.handle(cmd);
                }
                () = wait_pending(&mut self.pending) => {
                    self.on_tick();
                }
            }
        }
        debug!("timer driver stopped");
        self.controller
    }

    fn handle(&mut self, cmd: Command) {
        if cmd.interrupts_tick() {
            self.cancel();
        }
        // Observers see the new state before the caller gets its reply.
        match cmd {
            Command::Toggle(reply) => {
                let event = self.controller.toggle();
                self.settle(Some(&event));
                let _ = reply.send(event);
            }
            Command::Start(reply) => {
                let event = self.controller.start();
                self.settle(event.as_ref());
                let _ = reply.send(event);
            }
            Command::Pause(reply) => {
                let event = self.controller.pause();
                self.settle(event.as_ref());
                let _ = reply.send(event);
            }
            Command::Reset(reply) => {
                let event = self.controller.reset();
                self.settle(Some(&event));
                let _ = reply.send(event);
            }
            Command::Skip(reply) => {
                let event = self.controller.skip();
                self.settle(Some(&event));
                let _ = reply.send(event);
            }
            Command::SaveSettings(durations, reply) => {
                let event = self.controller.save_settings(durations);
                self.settle(Some(&event));
                let _ = reply.send(event);
            }
            Command::ResetAllProgress(reply) => {
                let event = self.controller.reset_all_progress();
                self.settle(Some(&event));
                let _ = reply.send(event);
            }
            Command::AddTodo(session, text, reply) => {
                let item = self.controller.add_todo(session, &text);
                self.settle(ledger_event(session, item.is_some()).as_ref());
                let _ = reply.send(item);
            }
            Command::ToggleTodo(session, id, reply) => {
                let changed = self.controller.toggle_todo(session, &id);
                self.settle(ledger_event(session, changed).as_ref());
                let _ = reply.send(changed);
            }
            Command::DeleteTodo(session, id, reply) => {
                let changed = self.controller.delete_todo(session, &id);
                self.settle(ledger_event(session, changed).as_ref());
                let _ = reply.send(changed);
            }
            Command::CompleteSession(session, reply) => {
                let changed = self.controller.complete_session(session);
                self.settle(ledger_event(session, changed).as_ref());
                let _ = reply.send(changed);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.controller.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn settle(&mut self, event: Option<&Event>) {
        if let Some(event) = event {
            self.emit(event);
        }
        self.arm(Instant::now());
        self.publish();
    }

    fn on_tick(&mut self) {
        let fired_at = match self.pending.take() {
            Some(p) => p.deadline,
            None => return,
        };
        trace!(remaining = self.controller.state().remaining_secs(), "tick");
        if let Some(event) = self.controller.tick() {
            self.emit(&event);
        }
        // Schedule from the previous deadline so ticks do not drift.
        self.arm(fired_at);
        self.publish();
    }

    /// Arm a tick one interval after `from`, unless one is already pending
    /// or the timer is stopped.
    fn arm(&mut self, from: Instant) {
        if self.pending.is_some() || !self.controller.state().is_running() {
            return;
        }
        let deadline = from + self.tick;
        self.pending = Some(PendingTick {
            sleep: Box::pin(sleep_until(deadline)),
            deadline,
        });
    }

    fn cancel(&mut self) {
        if self.pending.take().is_some() {
            trace!("pending tick cancelled");
        }
    }

    fn emit(&self, event: &Event) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event.clone());
    }

    fn publish(&self) {
        let state = *self.controller.state();
        self.state_tx.send_replace(state);
        self.focus_tx.send_if_modified(|running| {
            let now = state.focus_running();
            let changed = *running != now;
            *running = now;
            changed
        });
    }
}

fn ledger_event(session_number: u32, changed: bool) -> Option<Event> {
    changed.then(|| Event::LedgerChanged {
        session_number,
        at: Utc::now(),
    })
}

async fn wait_pending(pending: &mut Option<PendingTick>) {
    match pending {
        Some(p) => p.sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
