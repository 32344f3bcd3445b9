#![forbid(unsafe_code)]

//! Canonical input/event types for the panel controller.
//!
//! The embedding host translates its native input (DOM events, winit, a test
//! harness) into these types. All events derive `Clone` and `PartialEq` for
//! use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Pointer coordinates are logical pixels, 0-indexed from the top-left.
//! - Mouse and touch input share [`PointerEvent`]; touch contributes the
//!   first touch point.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::geometry::Point;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),
    /// A pointer (mouse or first-touch) event.
    Pointer(PointerEvent),
    /// The host viewport was resized.
    ViewportResized {
        /// New viewport width in pixels.
        width: f32,
        /// New viewport height in pixels.
        height: f32,
    },
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers (builder pattern).
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Super/Meta/Cmd is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Check if either platform "command" modifier (Ctrl or Cmd) is held.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl() || self.super_key()
    }
}

/// Key codes the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Tab key.
    Tab,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer event (mouse or first touch point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerKind,
    /// Pointer position in viewport coordinates.
    pub position: Point,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerKind, position: Point) -> Self {
        Self { kind, position }
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Primary button (or touch) went down.
    Down,
    /// Pointer moved while captured.
    Move,
    /// Primary button (or touch) was released.
    Up,
    /// Pointer left the host surface while captured.
    Leave,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::new(KeyCode::Char('1'));
        assert!(event.is_char('1'));
        assert!(!event.is_char('2'));
    }

    #[test]
    fn key_event_command_accepts_either_modifier() {
        let ctrl = KeyEvent::new(KeyCode::Char('1')).with_modifiers(Modifiers::CTRL);
        let cmd = KeyEvent::new(KeyCode::Char('1')).with_modifiers(Modifiers::SUPER);
        let shift = KeyEvent::new(KeyCode::Char('1')).with_modifiers(Modifiers::SHIFT);
        assert!(ctrl.command());
        assert!(cmd.command());
        assert!(!shift.command());
    }

    #[test]
    fn pointer_event_carries_position() {
        let p = PointerEvent::new(PointerKind::Down, Point::new(4.0, 9.0));
        assert_eq!(p.position, Point::new(4.0, 9.0));
        assert_eq!(p.kind, PointerKind::Down);
    }

    #[test]
    fn modifiers_default_is_none() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn event_is_clone_and_eq() {
        let event = Event::Key(KeyEvent::new(KeyCode::Escape));
        assert_eq!(event.clone(), event);
    }
}
