#![forbid(unsafe_code)]

//! Layout state machine for the assistant panel.
//!
//! A panel presents itself in exactly one of three variants at a time:
//! floating (freely placed, draggable, resizable), sidebar (docked to the
//! right edge), or fullpage (centered modal). The open flag is orthogonal —
//! a closed panel retains its last variant and geometry.
//!
//! # State Machine
//!
//! Variant changes form a complete directed graph on the three variants
//! (6 edges); every edge has its own target-geometry rule and there is no
//! intermediate state between any pair. Concurrent interaction is modeled as
//! a tagged union, so dragging-while-transitioning is unrepresentable:
//!
//! ```text
//! Idle ──begin_drag──▶ Dragging ──end_drag──▶ Idle
//! Idle ──begin_resize─▶ Resizing ──end_resize─▶ Idle
//! Idle ──request_variant─▶ Transitioning{to} ──commit_variant──▶ Idle
//! ```
//!
//! # Invariants
//!
//! 1. At most one transition is in flight: `request_variant` while any
//!    non-idle interaction holds the lock is a no-op reported as
//!    [`VariantRequest::Unchanged`].
//! 2. `toggle_open` is always honored, including mid-transition — closing
//!    must never be blocked by an in-flight animation.
//! 3. The floating rect always satisfies `min <= size <= max` and sits fully
//!    inside the last seen viewport.
//! 4. Target-geometry computation is pure: no observable effect until
//!    `commit_variant`.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, PanelRect, Size, Viewport, clamp_position, clamp_rect, clamp_size,
    drag_delta, resize_delta};

// ---------------------------------------------------------------------------
// Variants & configuration
// ---------------------------------------------------------------------------

/// The three presentation modes of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// Freely placed window; the only variant with persisted geometry.
    #[default]
    Floating,
    /// Docked to the right viewport edge, below the app header.
    Sidebar,
    /// Centered modal covering most of the viewport.
    Fullpage,
}

/// Fixed layout constants. Hard-coded at configuration time, never user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelConfig {
    /// Minimum floating panel size.
    pub min_size: Size,
    /// Maximum floating panel size.
    pub max_size: Size,
    /// Default floating panel size before any user resize.
    pub default_size: Size,
    /// Margin used when anchoring the default floating rect bottom-right.
    pub default_margin: f32,
    /// Sidebar column width.
    pub sidebar_width: f32,
    /// Fixed app header height; the sidebar starts below it.
    pub header_height: f32,
    /// Fullpage size as a fraction of the viewport, per axis.
    pub fullpage_fraction: f32,
    /// Pixel cap on the fullpage size.
    pub fullpage_max: Size,
    /// Nominal transition animation duration in milliseconds.
    pub transition_ms: u64,
    /// Hard ceiling on a transition as a multiple of the nominal duration;
    /// past the ceiling the pending variant is force-committed.
    pub transition_ceiling_factor: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            min_size: Size::new(320.0, 400.0),
            max_size: Size::new(800.0, 900.0),
            default_size: Size::new(400.0, 640.0),
            default_margin: 24.0,
            sidebar_width: 420.0,
            header_height: 64.0,
            fullpage_fraction: 0.9,
            fullpage_max: Size::new(1200.0, 900.0),
            transition_ms: 500,
            transition_ceiling_factor: 2,
        }
    }
}

impl PanelConfig {
    /// Validate the configuration, rejecting bounds that would make the
    /// geometry engine's preconditions unsatisfiable.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.min_size.width > self.max_size.width
            || self.min_size.height > self.max_size.height
        {
            return Err(ConfigError::MinExceedsMax {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.transition_ms == 0 || self.transition_ceiling_factor == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if !(0.0..=1.0).contains(&self.fullpage_fraction) {
            return Err(ConfigError::FractionOutOfRange {
                fraction: self.fullpage_fraction,
            });
        }
        Ok(self)
    }

    /// Default floating rect: anchored to the bottom-right corner with the
    /// configured margin, clamped into the viewport.
    #[must_use]
    pub fn default_floating(&self, viewport: Viewport) -> PanelRect {
        let size = clamp_size(self.default_size, self.min_size, self.max_size);
        let origin = Point::new(
            viewport.width - size.width - self.default_margin,
            viewport.height - size.height - self.default_margin,
        );
        PanelRect::new(clamp_position(origin, size, viewport), size)
    }
}

/// Configuration validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `min_size` exceeds `max_size` on some axis.
    MinExceedsMax {
        /// Configured minimum.
        min: Size,
        /// Configured maximum.
        max: Size,
    },
    /// Transition duration or ceiling factor is zero.
    ZeroDuration,
    /// Fullpage fraction outside `[0, 1]`.
    FractionOutOfRange {
        /// The offending fraction.
        fraction: f32,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinExceedsMax { min, max } => {
                write!(f, "min size {min:?} exceeds max size {max:?}")
            }
            Self::ZeroDuration => write!(f, "transition duration must be non-zero"),
            Self::FractionOutOfRange { fraction } => {
                write!(f, "fullpage fraction {fraction} outside [0, 1]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Target-geometry rules
// ---------------------------------------------------------------------------

/// Compute the display geometry for a target variant.
///
/// Pure and deterministic so a transition coordinator can compute "from" and
/// "to" rects before anything is mutated.
///
/// | Target | Position | Size |
/// |---|---|---|
/// | Floating | last floating origin, clamped | last floating size, clamped |
/// | Sidebar | pinned right, top = header height | fixed width × remaining height |
/// | Fullpage | centered | fraction of viewport, pixel-capped |
#[must_use]
pub fn target_geometry(
    target: LayoutVariant,
    viewport: Viewport,
    last_floating: PanelRect,
    cfg: &PanelConfig,
) -> PanelRect {
    match target {
        LayoutVariant::Floating => clamp_rect(last_floating, cfg.min_size, cfg.max_size, viewport),
        LayoutVariant::Sidebar => {
            let width = cfg.sidebar_width.min(viewport.width);
            let height = (viewport.height - cfg.header_height).max(0.0);
            PanelRect::new(
                Point::new(viewport.width - width, cfg.header_height),
                Size::new(width, height),
            )
        }
        LayoutVariant::Fullpage => {
            let size = Size::new(
                (viewport.width * cfg.fullpage_fraction).min(cfg.fullpage_max.width),
                (viewport.height * cfg.fullpage_fraction).min(cfg.fullpage_max.height),
            );
            let origin = Point::new(
                (viewport.width - size.width) / 2.0,
                (viewport.height - size.height) / 2.0,
            );
            PanelRect::new(clamp_position(origin, size, viewport), size)
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction state
// ---------------------------------------------------------------------------

/// An in-flight drag: the grab offset keeps the grab point under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Pointer position relative to the panel origin at drag start.
    pub grab_offset: Point,
}

/// An in-flight resize from the bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    /// Pointer position at resize start.
    pub pointer_start: Point,
    /// Panel size at resize start.
    pub origin_size: Size,
}

/// What the panel is currently doing. Exactly one arm at a time, so illegal
/// combinations (dragging while transitioning) cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Pointer-driven move of a floating panel.
    Dragging(DragSession),
    /// Pointer-driven resize of a floating panel.
    Resizing(ResizeSession),
    /// A variant change is animating; acts as the transition lock.
    Transitioning {
        /// The variant being transitioned to.
        to: LayoutVariant,
    },
}

impl Interaction {
    /// Whether the transition lock is held.
    #[inline]
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        matches!(self, Self::Transitioning { .. })
    }

    /// Whether any interaction holds the lock.
    #[inline]
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Outcome of a variant-change request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantRequest {
    /// Idempotent no-op: already at the target, or the lock is held.
    Unchanged,
    /// A transition was started; animate `from` → `to` then commit.
    Begin {
        /// Geometry currently displayed.
        from: PanelRect,
        /// Geometry of the target variant.
        to: PanelRect,
        /// The requested variant.
        target: LayoutVariant,
    },
}

// ---------------------------------------------------------------------------
// LayoutMachine
// ---------------------------------------------------------------------------

/// Owns the current variant, the open flag, the interaction lock, and the
/// last floating geometry.
///
/// The machine guarantees convergence regardless of presentation-layer
/// failure: a failed or timed-out animation commits through the same
/// [`commit_variant`](Self::commit_variant) path, just without frames.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMachine {
    cfg: PanelConfig,
    variant: LayoutVariant,
    is_open: bool,
    interaction: Interaction,
    floating: PanelRect,
}

impl LayoutMachine {
    /// Create a machine at the default variant with the default floating rect.
    #[must_use]
    pub fn new(cfg: PanelConfig, viewport: Viewport) -> Self {
        let floating = cfg.default_floating(viewport);
        Self {
            cfg,
            variant: LayoutVariant::default(),
            is_open: false,
            interaction: Interaction::Idle,
            floating,
        }
    }

    /// Restore a machine from persisted variant and floating geometry.
    #[must_use]
    pub fn restore(
        cfg: PanelConfig,
        viewport: Viewport,
        variant: LayoutVariant,
        floating: PanelRect,
    ) -> Self {
        let floating = clamp_rect(floating, cfg.min_size, cfg.max_size, viewport);
        Self {
            cfg,
            variant,
            is_open: false,
            interaction: Interaction::Idle,
            floating,
        }
    }

    /// Current variant.
    #[inline]
    #[must_use]
    pub const fn variant(&self) -> LayoutVariant {
        self.variant
    }

    /// Whether the panel is open.
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the transition lock is held.
    #[inline]
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.interaction.is_transitioning()
    }

    /// Current interaction state.
    #[inline]
    #[must_use]
    pub const fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Last known floating geometry (kept across sidebar/fullpage stints).
    #[inline]
    #[must_use]
    pub const fn floating(&self) -> PanelRect {
        self.floating
    }

    /// Layout configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PanelConfig {
        &self.cfg
    }

    /// Geometry currently displayed, derived for the active variant.
    #[must_use]
    pub fn current_geometry(&self, viewport: Viewport) -> PanelRect {
        target_geometry(self.variant, viewport, self.floating, &self.cfg)
    }

    /// Flip the open flag. Always allowed, even mid-transition.
    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Set the open flag directly. Always allowed, even mid-transition.
    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    /// Request a variant change.
    ///
    /// Returns [`VariantRequest::Unchanged`] when the target equals the
    /// current variant or any interaction holds the lock (idempotent,
    /// reported as success with no observable change). Otherwise enters
    /// `Transitioning { to }` and returns the from/to geometries for the
    /// transition coordinator.
    pub fn request_variant(
        &mut self,
        target: LayoutVariant,
        viewport: Viewport,
    ) -> VariantRequest {
        if target == self.variant || !self.interaction.is_idle() {
            return VariantRequest::Unchanged;
        }
        let from = self.current_geometry(viewport);
        let to = target_geometry(target, viewport, self.floating, &self.cfg);
        self.interaction = Interaction::Transitioning { to: target };
        VariantRequest::Begin { from, to, target }
    }

    /// Commit the pending variant change and release the lock.
    ///
    /// Used for both the animated path (coordinator resolved) and the
    /// fallback path (detached surface, timeout). Returns the committed
    /// variant, or `None` if no transition was pending.
    pub fn commit_variant(&mut self, viewport: Viewport) -> Option<LayoutVariant> {
        let Interaction::Transitioning { to } = self.interaction else {
            return None;
        };
        self.variant = to;
        if to == LayoutVariant::Floating {
            // The commit re-clamps against the current viewport; this is the
            // moment the persisted floating geometry converges.
            self.floating = clamp_rect(self.floating, self.cfg.min_size, self.cfg.max_size, viewport);
        }
        self.interaction = Interaction::Idle;
        Some(to)
    }

    /// Begin a drag. Only a floating, open, idle panel accepts one.
    ///
    /// Returns `false` (no state change) otherwise.
    pub fn begin_drag(&mut self, pointer: Point, viewport: Viewport) -> bool {
        if self.variant != LayoutVariant::Floating
            || !self.is_open
            || !self.interaction.is_idle()
        {
            return false;
        }
        let rect = self.current_geometry(viewport);
        self.interaction = Interaction::Dragging(DragSession {
            grab_offset: Point::new(pointer.x - rect.origin.x, pointer.y - rect.origin.y),
        });
        true
    }

    /// Update an in-flight drag; the committed origin is always clamped.
    ///
    /// Returns `true` if a drag was active and the geometry moved.
    pub fn update_drag(&mut self, pointer: Point, viewport: Viewport) -> bool {
        let Interaction::Dragging(session) = self.interaction else {
            return false;
        };
        let origin = drag_delta(pointer, session.grab_offset);
        self.floating.origin = clamp_position(origin, self.floating.size, viewport);
        true
    }

    /// End a drag. Returns `true` if a session was active.
    pub fn end_drag(&mut self) -> bool {
        if matches!(self.interaction, Interaction::Dragging(_)) {
            self.interaction = Interaction::Idle;
            true
        } else {
            false
        }
    }

    /// Begin a resize from the bottom-right corner. Same gating as drag.
    pub fn begin_resize(&mut self, pointer: Point) -> bool {
        if self.variant != LayoutVariant::Floating
            || !self.is_open
            || !self.interaction.is_idle()
        {
            return false;
        }
        self.interaction = Interaction::Resizing(ResizeSession {
            pointer_start: pointer,
            origin_size: self.floating.size,
        });
        true
    }

    /// Update an in-flight resize; size bounds hold after every call.
    pub fn update_resize(&mut self, pointer: Point, viewport: Viewport) -> bool {
        let Interaction::Resizing(session) = self.interaction else {
            return false;
        };
        let raw = resize_delta(session.pointer_start, pointer, session.origin_size);
        self.floating.size = clamp_size(raw, self.cfg.min_size, self.cfg.max_size);
        // Growing toward the bottom-right can push the panel off-viewport.
        self.floating.origin = clamp_position(self.floating.origin, self.floating.size, viewport);
        true
    }

    /// End a resize. Returns `true` if a session was active.
    pub fn end_resize(&mut self) -> bool {
        if matches!(self.interaction, Interaction::Resizing(_)) {
            self.interaction = Interaction::Idle;
            true
        } else {
            false
        }
    }

    /// Re-clamp the floating rect after a viewport resize.
    pub fn reclamp(&mut self, viewport: Viewport) {
        self.floating = clamp_rect(self.floating, self.cfg.min_size, self.cfg.max_size, viewport);
    }
}
