//! Per-session task lists.
//!
//! Each of the four sessions of a cycle can carry a small todo list. The
//! whole ledger is wiped when the cycle completes. Stored as JSON under
//! `session-data`; timestamps keep full sub-second precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::SESSIONS_PER_CYCLE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    /// 1-based session number within the cycle.
    pub session_number: u32,
    pub todos: Vec<TodoItem>,
    pub is_completed: bool,
}

impl SessionEntry {
    fn new(session_number: u32) -> Self {
        Self {
            session_number,
            todos: Vec::new(),
            is_completed: false,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }
}

/// Ordered collection of session entries, at most one per session number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLedger {
    entries: Vec<SessionEntry>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn session(&self, session_number: u32) -> Option<&SessionEntry> {
        self.entries
            .iter()
            .find(|e| e.session_number == session_number)
    }

    /// `(completed, total)` todos for a session; `(0, 0)` when it has none.
    pub fn counts(&self, session_number: u32) -> (usize, usize) {
        self.session(session_number)
            .map(|e| (e.completed_count(), e.todos.len()))
            .unwrap_or((0, 0))
    }

    /// Append a todo to a session. Blank text and unknown session numbers
    /// are ignored.
    pub fn add_todo(
        &mut self,
        session_number: u32,
        text: &str,
        at: DateTime<Utc>,
    ) -> Option<&TodoItem> {
        let text = text.trim();
        if text.is_empty() || !valid_session(session_number) {
            return None;
        }
        let item = TodoItem {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
            created_at: at,
        };
        let entry = self.entry_mut(session_number);
        entry.todos.push(item);
        entry.todos.last()
    }

    /// Flip a todo's completion flag. Returns false if it does not exist.
    pub fn toggle_todo(&mut self, session_number: u32, todo_id: &str) -> bool {
        let Some(entry) = self.existing_mut(session_number) else {
            return false;
        };
        match entry.todos.iter_mut().find(|t| t.id == todo_id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                true
            }
            None => false,
        }
    }

    pub fn delete_todo(&mut self, session_number: u32, todo_id: &str) -> bool {
        let Some(entry) = self.existing_mut(session_number) else {
            return false;
        };
        let before = entry.todos.len();
        entry.todos.retain(|t| t.id != todo_id);
        entry.todos.len() != before
    }

    /// Mark a session as done. Only sessions that already have an entry can
    /// be marked.
    pub fn complete_session(&mut self, session_number: u32) -> bool {
        match self.existing_mut(session_number) {
            Some(entry) => {
                entry.is_completed = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn existing_mut(&mut self, session_number: u32) -> Option<&mut SessionEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.session_number == session_number)
    }

    fn entry_mut(&mut self, session_number: u32) -> &mut SessionEntry {
        let pos = match self
            .entries
            .iter()
            .position(|e| e.session_number == session_number)
        {
            Some(pos) => pos,
            None => {
                self.entries.push(SessionEntry::new(session_number));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos]
    }
}

fn valid_session(session_number: u32) -> bool {
    (1..=SESSIONS_PER_CYCLE).contains(&session_number)
}
