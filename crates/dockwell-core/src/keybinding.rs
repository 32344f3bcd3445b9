#![forbid(unsafe_code)]

//! Key-to-action mapping for the panel's keyboard surface.
//!
//! Maps key events to high-level [`PanelAction`]s based on panel state:
//!
//! - `Escape` → [`PanelAction::Close`], **always** — closing must never be
//!   trapped behind a stuck animation, so this bypasses the transition lock.
//! - `Ctrl/Cmd+1/2/3` → switch to floating/sidebar/fullpage, only while the
//!   panel is open and not transitioning.
//!
//! The mapper is stateless; callers pass the relevant state flags per event,
//! mirroring how the rest of the controller treats input as pure data.

use crate::event::{KeyCode, KeyEvent};
use crate::layout::LayoutVariant;

/// High-level commands produced from key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Close the panel (unconditional; bypasses the transition lock).
    Close,
    /// Switch to a layout variant.
    SetVariant(LayoutVariant),
}

/// Panel state flags that gate action resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    /// Whether the panel is open.
    pub is_open: bool,
    /// Whether the transition lock is held.
    pub is_transitioning: bool,
}

/// Map a key event to an action, if any.
#[must_use]
pub fn map_key(event: &KeyEvent, state: &KeyState) -> Option<PanelAction> {
    if event.code == KeyCode::Escape {
        return state.is_open.then_some(PanelAction::Close);
    }

    if !state.is_open || state.is_transitioning || !event.command() {
        return None;
    }

    match event.code {
        KeyCode::Char('1') => Some(PanelAction::SetVariant(LayoutVariant::Floating)),
        KeyCode::Char('2') => Some(PanelAction::SetVariant(LayoutVariant::Sidebar)),
        KeyCode::Char('3') => Some(PanelAction::SetVariant(LayoutVariant::Fullpage)),
        _ => None,
    }
}
