//! Conversation state machine: the turn log, the sending gate and the
//! open/closed flag that the presentation layer renders.

use serde::{Deserialize, Serialize};

/// First assistant turn of every conversation.
pub const GREETING: &str = "Hi! Ask me about the site or the blog, and I will help.";

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Whether a send is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Sending,
}

/// State of one conversation.
///
/// Turns are append-only. Every send accepted by [`Conversation::begin_send`]
/// is closed by exactly one [`Conversation::finish_send`].
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
    phase: Phase,
    open: bool,
    input: String,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A closed, idle conversation seeded with the greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(GREETING)],
            phase: Phase::Idle,
            open: false,
            input: String::new(),
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == Phase::Sending
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Composer buffer contents
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// `Idle → Sending`.
    ///
    /// Returns the trimmed message to dispatch, or `None` when the input is
    /// blank or a send is already in flight. Rejection leaves the state
    /// untouched.
    pub fn begin_send(&mut self, raw_input: &str) -> Option<String> {
        if self.is_sending() {
            return None;
        }

        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return None;
        }

        let message = trimmed.to_string();
        self.turns.push(Turn::user(message.clone()));
        self.input.clear();
        self.phase = Phase::Sending;
        Some(message)
    }

    /// `Sending → Idle`, appending the assistant reply.
    ///
    /// Returns false (and appends nothing) when no send was in flight.
    pub fn finish_send(&mut self, reply: String) -> bool {
        if !self.is_sending() {
            tracing::warn!("Reply arrived with no send in flight; ignoring");
            return false;
        }

        self.turns.push(Turn::assistant(reply));
        self.phase = Phase::Idle;
        true
    }
}
