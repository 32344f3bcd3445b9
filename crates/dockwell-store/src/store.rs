#![forbid(unsafe_code)]

//! The persistence store: two independent namespaces over storage backends.
//!
//! - **Durable** (survives restart): preferences and the last committed
//!   layout snapshot.
//! - **Ephemeral-per-tab** (survives reload, not restart): the transcript
//!   of the single active conversation.
//!
//! Persistence is a best-effort cache, not a source of truth:
//!
//! # Invariants
//!
//! 1. Reads never fail: a miss, corrupt JSON, or a schema-version mismatch
//!    yields the hard-coded default (or an empty session) and a warning log.
//!    A partial or corrupt object is never propagated.
//! 2. Writes never fail the caller: quota and serialization errors are
//!    swallowed and logged. Callers issue writes synchronously in the order
//!    the state changes were committed, so the stores never reference a
//!    newer variant with older geometry than what was last displayed.
//! 3. A session read whose stored conversation id differs from the caller's
//!    is a miss, not an error (stale-session guard).

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::records::{
    ChatMessage, LayoutSnapshot, SCHEMA_VERSION, SessionRecord, UserPreferences, Versioned,
};

/// Durable key for user preferences.
pub const PREFERENCES_KEY: &str = "app.chat.preferences";
/// Durable key for the last committed layout snapshot.
pub const LAYOUT_KEY: &str = "app.chat.layout";
/// Ephemeral key for the active conversation transcript.
pub const SESSION_KEY: &str = "app.chat.session";

/// Two-namespace persistence store for panel state.
pub struct PersistenceStore {
    durable: Box<dyn StorageBackend>,
    ephemeral: Box<dyn StorageBackend>,
}

impl std::fmt::Debug for PersistenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceStore").finish_non_exhaustive()
    }
}

impl PersistenceStore {
    /// Create a store over a durable and an ephemeral backend.
    #[must_use]
    pub fn new(durable: Box<dyn StorageBackend>, ephemeral: Box<dyn StorageBackend>) -> Self {
        Self { durable, ephemeral }
    }

    // -- preferences --------------------------------------------------------

    /// Load preferences; hard-coded defaults on miss or corruption.
    #[must_use]
    pub fn load_preferences(&self) -> UserPreferences {
        read_or_default(&*self.durable, PREFERENCES_KEY).unwrap_or_default()
    }

    /// Persist preferences (whole object, best effort).
    pub fn save_preferences(&mut self, prefs: &UserPreferences) {
        write_logged(&mut *self.durable, PREFERENCES_KEY, prefs);
    }

    // -- layout -------------------------------------------------------------

    /// Load the last committed layout snapshot, if one survives intact.
    #[must_use]
    pub fn load_layout(&self) -> Option<LayoutSnapshot> {
        read_or_default(&*self.durable, LAYOUT_KEY)
    }

    /// Persist the layout snapshot (whole object, best effort).
    pub fn save_layout(&mut self, snapshot: &LayoutSnapshot) {
        write_logged(&mut *self.durable, LAYOUT_KEY, snapshot);
    }

    // -- session ------------------------------------------------------------

    /// Load the transcript for `conversation_id`.
    ///
    /// Returns an empty list on miss, corruption, or when the stored slot
    /// belongs to a different conversation — a stale transcript must never
    /// leak across client-side navigation.
    #[must_use]
    pub fn load_session(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let Some(record) = read_or_default::<SessionRecord>(&*self.ephemeral, SESSION_KEY) else {
            return Vec::new();
        };
        if record.conversation_id != conversation_id {
            debug!(
                stored = %record.conversation_id,
                requested = %conversation_id,
                "stale session slot ignored"
            );
            return Vec::new();
        }
        record.messages
    }

    /// Persist the transcript for `conversation_id` into the single active
    /// slot (whole object, best effort).
    pub fn save_session(&mut self, conversation_id: &str, messages: &[ChatMessage]) {
        let record = SessionRecord {
            conversation_id: conversation_id.to_owned(),
            messages: messages.to_vec(),
            last_active_ms: now_ms(),
        };
        write_logged(&mut *self.ephemeral, SESSION_KEY, &record);
    }

    // -- reset --------------------------------------------------------------

    /// Remove every persisted key from both namespaces.
    pub fn reset(&mut self) {
        for key in [PREFERENCES_KEY, LAYOUT_KEY] {
            if let Err(e) = self.durable.remove(key) {
                warn!(key, error = %e, "failed to remove durable key");
            }
        }
        if let Err(e) = self.ephemeral.remove(SESSION_KEY) {
            warn!(key = SESSION_KEY, error = %e, "failed to remove session slot");
        }
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Read and unwrap a versioned record; any failure collapses to `None`.
fn read_or_default<T: DeserializeOwned>(backend: &dyn StorageBackend, key: &str) -> Option<T> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "storage read failed; using defaults");
            return None;
        }
    };
    match serde_json::from_str::<Versioned<T>>(&raw) {
        Ok(wrapped) if wrapped.version == SCHEMA_VERSION => Some(wrapped.data),
        Ok(wrapped) => {
            warn!(
                key,
                found = wrapped.version,
                expected = SCHEMA_VERSION,
                "schema version mismatch; using defaults"
            );
            None
        }
        Err(e) => {
            warn!(key, error = %e, "corrupt record; using defaults");
            None
        }
    }
}

/// Serialize and write a versioned record; any failure is logged and
/// swallowed.
fn write_logged<T: Serialize>(backend: &mut dyn StorageBackend, key: &str, value: &T) {
    let wrapped = Versioned {
        version: SCHEMA_VERSION,
        data: value,
    };
    let json = match serde_json::to_string(&wrapped) {
        Ok(json) => json,
        Err(e) => {
            warn!(key, error = %e, "failed to serialize record; write skipped");
            return;
        }
    };
    if let Err(e) = backend.set(key, &json) {
        warn!(key, error = %e, "storage write failed; continuing without persistence");
    }
}
