#![forbid(unsafe_code)]

//! Dockwell Store
//!
//! Versioned, corruption-tolerant persistence for panel state.
//!
//! # Key Components
//!
//! - [`StorageBackend`] - Key-value capability trait ({get, set, remove})
//! - [`MemoryStorage`] / [`FileStorage`] - In-memory and atomic-file backends
//! - [`PersistenceStore`] - Two independent namespaces (durable + ephemeral)
//!   over any pair of backends
//! - [`records`] - Schema-versioned record types with a `_v` envelope
//!
//! # Role in Dockwell
//! Durability is advisory, not required for correctness: every read path
//! degrades to hard-coded defaults and every write path swallows and logs
//! failure. The controller treats this crate as a best-effort cache.

pub mod backend;
pub mod records;
pub mod store;

pub use backend::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use records::{
    ChatMessage, ChatRole, LayoutSnapshot, PreferencesUpdate, SCHEMA_VERSION, SessionRecord,
    TYPING_MESSAGE_ID, UserPreferences, Versioned,
};
pub use store::{LAYOUT_KEY, PREFERENCES_KEY, PersistenceStore, SESSION_KEY, now_ms};
