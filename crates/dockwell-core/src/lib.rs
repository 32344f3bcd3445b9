#![forbid(unsafe_code)]

//! Dockwell Core
//!
//! Geometry, input events, and the layout state machine for the Dockwell
//! assistant panel.
//!
//! # Key Components
//!
//! - [`geometry`] - Total clamp/delta math turning pointer coordinates into
//!   panel geometry
//! - [`event`] - Canonical pointer/key/viewport input types
//! - [`layout`] - The three-variant layout state machine and its
//!   target-geometry rules
//! - [`keybinding`] - Key-to-action mapping for the keyboard surface
//!
//! # Role in Dockwell
//! `dockwell-core` is the dependency-light foundation: every other crate in
//! the workspace consumes these types. Nothing here touches a host surface
//! or storage; it is all pure state and math.

pub mod event;
pub mod geometry;
pub mod keybinding;
pub mod layout;

pub use event::{Event, KeyCode, KeyEvent, Modifiers, PointerEvent, PointerKind};
pub use geometry::{
    PanelRect, Point, Size, Viewport, clamp_position, clamp_rect, clamp_size, drag_delta,
    resize_delta,
};
pub use keybinding::{KeyState, PanelAction, map_key};
pub use layout::{
    ConfigError, DragSession, Interaction, LayoutMachine, LayoutVariant, PanelConfig,
    ResizeSession, VariantRequest, target_geometry,
};
