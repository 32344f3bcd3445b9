#![forbid(unsafe_code)]

//! Dockwell
//!
//! The composition-root crate of the Dockwell workspace: a multi-state
//! assistant panel controller with floating, sidebar, and fullpage layouts,
//! animated transitions, and best-effort persistence.
//!
//! # Key Components
//!
//! - [`PanelController`] - The one stateful object an embedding UI talks to
//! - [`SessionTranscript`] - Chat transcript with the typing-indicator
//!   sentinel rules
//! - [`PointerGrab`] / [`CaptureFlag`] - Scope-bound pointer capture
//!
//! # Quick Start
//!
//! ```
//! use dockwell::{MemoryStorage, PanelController, PersistenceStore, Viewport};
//! use dockwell::{LayoutVariant, PanelRect, PanelSurface};
//!
//! struct NullSurface;
//!
//! impl PanelSurface for NullSurface {
//!     fn is_attached(&self) -> bool {
//!         false
//!     }
//!     fn apply_geometry(&mut self, _rect: PanelRect) {}
//!     fn set_pointer_capture(&mut self, _active: bool) {}
//! }
//!
//! let store = PersistenceStore::new(
//!     Box::new(MemoryStorage::new()),
//!     Box::new(MemoryStorage::new()),
//! );
//! let viewport = Viewport::new(1920.0, 1080.0);
//! let mut panel = PanelController::new("conv-1", viewport, NullSurface, store);
//!
//! panel.open();
//! panel.request_variant(LayoutVariant::Sidebar);
//! assert_eq!(panel.state().variant, LayoutVariant::Sidebar);
//! ```
//!
//! The lower layers are usable on their own: `dockwell-core` for the pure
//! state machine and geometry math, `dockwell-anim` for the transition
//! coordinator, `dockwell-store` for the persistence schema. Their surfaces
//! are re-exported here so most embedders depend on this crate alone.

pub mod controller;
pub mod grab;
pub mod session;

pub use controller::{PanelController, PanelUiState, SubscriptionId};
pub use grab::{CaptureFlag, PointerGrab};
pub use session::SessionTranscript;

pub use dockwell_anim::{
    Animation, EasingFn, GeometryTween, PanelSurface, TransitionCoordinator, TransitionError,
    TransitionProgress, ease_in, ease_in_out, ease_out, linear,
};
pub use dockwell_core::{
    ConfigError, Event, Interaction, KeyCode, KeyEvent, LayoutMachine, LayoutVariant, Modifiers,
    PanelAction, PanelConfig, PanelRect, Point, PointerEvent, PointerKind, Size, VariantRequest,
    Viewport,
};
pub use dockwell_store::{
    ChatMessage, ChatRole, FileStorage, LayoutSnapshot, MemoryStorage, PersistenceStore,
    PreferencesUpdate, StorageBackend, StorageError, StorageResult, TYPING_MESSAGE_ID,
    UserPreferences,
};
