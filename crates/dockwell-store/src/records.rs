#![forbid(unsafe_code)]

//! Persisted record schemas.
//!
//! Every record is wrapped in a [`Versioned`] envelope carrying a `_v`
//! schema version field. Readers reject mismatched versions the same way
//! they treat corrupt JSON: fall back to defaults, never propagate a
//! partial object.

use serde::{Deserialize, Serialize};

use dockwell_core::geometry::PanelRect;
use dockwell_core::layout::LayoutVariant;

/// Current schema version for all persisted records.
pub const SCHEMA_VERSION: u32 = 1;

/// Reserved message id for the transient "typing" indicator entry.
///
/// At most one such entry exists in a transcript, and it is always removed
/// before the corresponding real response is appended. It is never
/// persisted.
pub const TYPING_MESSAGE_ID: &str = "__typing__";

/// Schema-versioned envelope around a persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Schema version of `data`.
    #[serde(rename = "_v")]
    pub version: u32,
    /// The wrapped record.
    pub data: T,
}

impl<T> Versioned<T> {
    /// Wrap a record at the current schema version.
    #[must_use]
    pub fn current(data: T) -> Self {
        Self {
            version: SCHEMA_VERSION,
            data,
        }
    }
}

/// User preferences for the panel.
///
/// Created with hard-coded defaults on first use; afterwards only ever
/// replaced wholesale after merging a [`PreferencesUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserPreferences {
    /// Variant the panel opens in when nothing is remembered.
    pub default_layout: LayoutVariant,
    /// Whether the last layout and geometry are restored across sessions.
    pub remember_layout: bool,
    /// Whether layout transitions animate.
    pub animations: bool,
    /// Whether the panel re-fits itself on viewport resize.
    pub auto_resize: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_layout: LayoutVariant::Floating,
            remember_layout: true,
            animations: true,
            auto_resize: false,
        }
    }
}

/// Partial preferences update; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    /// New default layout, if changing.
    pub default_layout: Option<LayoutVariant>,
    /// New remember-layout flag, if changing.
    pub remember_layout: Option<bool>,
    /// New animations flag, if changing.
    pub animations: Option<bool>,
    /// New auto-resize flag, if changing.
    pub auto_resize: Option<bool>,
}

impl UserPreferences {
    /// Merge a partial update into a full preferences object.
    #[must_use]
    pub fn merged(&self, update: &PreferencesUpdate) -> Self {
        Self {
            default_layout: update.default_layout.unwrap_or(self.default_layout),
            remember_layout: update.remember_layout.unwrap_or(self.remember_layout),
            animations: update.animations.unwrap_or(self.animations),
            auto_resize: update.auto_resize.unwrap_or(self.auto_resize),
        }
    }
}

/// Durable snapshot of the last committed layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// The committed variant.
    pub variant: LayoutVariant,
    /// Last known floating geometry.
    pub floating: PanelRect,
}

/// Who produced a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// The human operator.
    User,
    /// The assistant.
    Assistant,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable message id; [`TYPING_MESSAGE_ID`] is reserved.
    pub id: String,
    /// Message author.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl ChatMessage {
    /// Whether this is the transient typing indicator.
    #[must_use]
    pub fn is_typing_indicator(&self) -> bool {
        self.id == TYPING_MESSAGE_ID
    }
}

/// Ephemeral-per-tab transcript slot (single active conversation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Conversation the transcript belongs to; a mismatch on read is
    /// treated as a miss (stale-session guard).
    pub conversation_id: String,
    /// Transcript entries, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Milliseconds since the Unix epoch of the last mutation.
    pub last_active_ms: u64,
}
