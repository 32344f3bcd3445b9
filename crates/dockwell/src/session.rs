#![forbid(unsafe_code)]

//! Conversation transcript with the transient typing indicator.
//!
//! # Invariants
//!
//! 1. The typing indicator (id [`TYPING_MESSAGE_ID`]) is present at most
//!    once, always as the last entry.
//! 2. Appending an assistant message removes the indicator first — the
//!    indicator is never left behind once the real response has arrived.
//! 3. [`persistable`](SessionTranscript::persistable) never yields the
//!    indicator; it is presentation state, not transcript history.

use dockwell_store::{ChatMessage, ChatRole, TYPING_MESSAGE_ID};

/// The ordered, append-mostly transcript of one conversation.
#[derive(Debug, Clone, Default)]
pub struct SessionTranscript {
    messages: Vec<ChatMessage>,
}

impl SessionTranscript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a transcript from persisted messages, dropping any indicator
    /// that slipped into an old record.
    #[must_use]
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        let messages = messages
            .into_iter()
            .filter(|m| !m.is_typing_indicator())
            .collect();
        Self { messages }
    }

    /// All entries, oldest first, including a live typing indicator.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Entries that belong in the persisted session record.
    pub fn persistable(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| !m.is_typing_indicator())
    }

    /// Whether the typing indicator is showing.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.messages.iter().any(ChatMessage::is_typing_indicator)
    }

    /// Append a message.
    ///
    /// An assistant message replaces any live typing indicator; a message
    /// reusing the reserved indicator id is rejected.
    pub fn append(&mut self, message: ChatMessage) -> bool {
        if message.is_typing_indicator() {
            return false;
        }
        if message.role == ChatRole::Assistant {
            self.messages.retain(|m| !m.is_typing_indicator());
        }
        self.messages.push(message);
        true
    }

    /// Remove a message by id. Returns `true` if an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    /// Show or hide the typing indicator.
    ///
    /// Returns `true` if the transcript changed.
    pub fn set_loading(&mut self, loading: bool, timestamp_ms: u64) -> bool {
        if loading {
            if self.is_loading() {
                return false;
            }
            self.messages.push(ChatMessage {
                id: TYPING_MESSAGE_ID.to_owned(),
                role: ChatRole::Assistant,
                content: String::new(),
                timestamp_ms,
            });
            true
        } else {
            let before = self.messages.len();
            self.messages.retain(|m| !m.is_typing_indicator());
            self.messages.len() != before
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
