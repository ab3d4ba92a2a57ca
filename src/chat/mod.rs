//! Chat module: conversation client for the remote answering service
//!
//! Holds per-session conversation state, dispatches one request per accepted
//! turn and normalizes whatever the service replies with.

pub mod config;
pub mod dispatcher;
pub mod normalize;
pub mod session;
pub mod state;
pub mod widget;

pub use config::ChatConfig;
pub use dispatcher::{AnsweringService, HttpAnsweringService, TransportError, TurnDispatcher};
pub use normalize::normalize;
pub use session::SessionId;
pub use state::{Conversation, Phase, Role, Turn};
pub use widget::{ChatSession, ChatView};
