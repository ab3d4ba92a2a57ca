//! Chat session handle: one mounted conversation widget.
//!
//! Owns the session id, the conversation state and the dispatcher. The state
//! lives behind a lock so the presentation layer can render a [`ChatView`]
//! while a send is in flight.

use super::dispatcher::TurnDispatcher;
use super::session::SessionId;
use super::state::{Conversation, Turn};
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const HEADER_TITLE: &str = "Chat with me";
pub const HEADER_SUBTITLE: &str = "Ask anything. We respond fast.";
pub const LAUNCHER_LABEL: &str = "Chat";
pub const CLOSE_LABEL: &str = "Close";
pub const INPUT_PLACEHOLDER: &str = "Type a message";
pub const SEND_LABEL: &str = "Send";
pub const SENDING_LABEL: &str = "Sending";

/// Everything the presentation layer needs to draw the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub open: bool,
    pub turns: Vec<Turn>,
    /// Typing indicator, shown while a reply is pending
    pub typing: bool,
    pub input: String,
    pub composer_enabled: bool,
    pub send_label: &'static str,
}

/// A mounted conversation. Dropping it unmounts the widget.
pub struct ChatSession {
    id: SessionId,
    state: Arc<RwLock<Conversation>>,
    dispatcher: TurnDispatcher,
}

impl ChatSession {
    /// Mount a new session with a freshly generated id.
    pub fn new(dispatcher: TurnDispatcher) -> Self {
        let id = SessionId::generate();
        debug!(session_id = %id, "Chat session mounted");
        Self {
            id,
            state: Arc::new(RwLock::new(Conversation::new())),
            dispatcher,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Send `raw_input` and wait for the assistant turn.
    ///
    /// Blank input, or input arriving while another send is in flight, is
    /// dropped without side effects. Once accepted, the request runs on its
    /// own task: dropping this future stops the wait, not the send.
    pub async fn send(&self, raw_input: &str) {
        let Some(handle) = self.spawn_send(raw_input).await else {
            return;
        };

        if let Err(e) = handle.await {
            warn!(session_id = %self.id, "Chat send task failed: {}", e);
        }
    }

    /// Send the composer buffer.
    pub async fn submit(&self) {
        let input = self.state.read().await.input().to_string();
        self.send(&input).await;
    }

    /// Like [`ChatSession::send`], but returns the task handle instead of
    /// waiting on it.
    ///
    /// The task only holds a weak reference to the conversation; if the session
    /// is dropped before the reply arrives, the reply is discarded. Returns
    /// `None` when the input was dropped.
    pub async fn spawn_send(&self, raw_input: &str) -> Option<JoinHandle<()>> {
        let message = self.accept(raw_input).await?;
        Some(self.dispatch(message))
    }

    fn dispatch(&self, message: String) -> JoinHandle<()> {
        let state: Weak<RwLock<Conversation>> = Arc::downgrade(&self.state);
        let dispatcher = self.dispatcher.clone();
        let id = self.id.clone();

        tokio::spawn(async move {
            let reply = dispatcher.resolve(&message, &id).await;
            match state.upgrade() {
                Some(state) => {
                    state.write().await.finish_send(reply);
                }
                None => debug!(session_id = %id, "Session unmounted before reply; discarding"),
            }
        })
    }

    async fn accept(&self, raw_input: &str) -> Option<String> {
        let accepted = self.state.write().await.begin_send(raw_input);
        match &accepted {
            Some(message) => {
                debug!(session_id = %self.id, chars = message.chars().count(), "Sending chat turn")
            }
            None => debug!(session_id = %self.id, "Dropped blank or concurrent chat turn"),
        }
        accepted
    }

    pub async fn set_input(&self, input: impl Into<String>) {
        self.state.write().await.set_input(input);
    }

    pub async fn open(&self) {
        self.state.write().await.set_open(true);
    }

    pub async fn close(&self) {
        self.state.write().await.set_open(false);
    }

    pub async fn toggle(&self) -> bool {
        self.state.write().await.toggle_open()
    }

    pub async fn is_sending(&self) -> bool {
        self.state.read().await.is_sending()
    }

    pub async fn turns(&self) -> Vec<Turn> {
        self.state.read().await.turns().to_vec()
    }

    /// Snapshot for rendering
    pub async fn view(&self) -> ChatView {
        let convo = self.state.read().await;
        let sending = convo.is_sending();
        ChatView {
            open: convo.is_open(),
            turns: convo.turns().to_vec(),
            typing: sending,
            input: convo.input().to_string(),
            composer_enabled: !sending,
            send_label: if sending { SENDING_LABEL } else { SEND_LABEL },
        }
    }
}
