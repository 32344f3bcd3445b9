#![forbid(unsafe_code)]

//! Geometric primitives and the panel geometry engine.
//!
//! All coordinates are logical pixels (`f32`, origin at top-left). This module
//! is the only place where raw pointer coordinates are turned into panel
//! geometry, so every clamping decision lives here and is unit-testable
//! without a host surface.
//!
//! # Invariants
//!
//! 1. Every function is total: finite inputs produce finite outputs, and
//!    non-finite components sanitize to the lower bound. No output is ever
//!    NaN or negative where a bound forbids it.
//! 2. `clamp_position` keeps the panel fully inside the viewport whenever the
//!    panel fits; an oversized panel clamps to the top-left corner `(0, 0)`.
//! 3. `clamp_size` requires `min <= max` componentwise. The bounds are fixed
//!    configuration constants, never user input, so the caller guarantees
//!    this at configuration time.

use serde::{Deserialize, Serialize};

/// A point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: f32,
    /// Vertical offset from the top edge.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Placement of a floating panel: origin (top-left) plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelRect {
    /// Top-left corner.
    pub origin: Point,
    /// Panel extent.
    pub size: Size,
}

impl PanelRect {
    /// Create a new panel rect.
    #[inline]
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Check whether a point falls inside the rect.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x
            && p.x < self.origin.x + self.size.width
            && p.y >= self.origin.y
            && p.y < self.origin.y + self.size.height
    }
}

/// The host viewport the panel is clamped against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width in pixels.
    pub width: f32,
    /// Viewport height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Create a new viewport.
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Sanitize a single coordinate: non-finite values collapse to zero.
#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

/// Clamp a scalar into `[0, upper]` where `upper` itself may be negative
/// (panel larger than viewport) or non-finite.
#[inline]
fn clamp_axis(v: f32, upper: f32) -> f32 {
    let upper = finite_or_zero(upper).max(0.0);
    finite_or_zero(v).clamp(0.0, upper)
}

/// Clamp a panel origin so the panel stays fully inside the viewport.
///
/// `x` is clamped to `[0, viewport.width - panel.width]` and `y` likewise.
/// If the panel exceeds the viewport on an axis, that axis clamps to `0`.
#[must_use]
pub fn clamp_position(pos: Point, panel: Size, viewport: Viewport) -> Point {
    Point {
        x: clamp_axis(pos.x, viewport.width - panel.width),
        y: clamp_axis(pos.y, viewport.height - panel.height),
    }
}

/// Componentwise clamp of a panel size into `[min, max]`.
///
/// Precondition: `min <= max` componentwise (fixed configuration constants).
#[must_use]
pub fn clamp_size(size: Size, min: Size, max: Size) -> Size {
    Size {
        width: finite_or_zero(size.width).clamp(min.width, max.width),
        height: finite_or_zero(size.height).clamp(min.height, max.height),
    }
}

/// New top-left for a drag, assuming the grab point stays under the pointer.
///
/// `grab_offset` is the pointer position relative to the panel origin at
/// drag start. Mouse and first-touch input feed this identically.
#[inline]
#[must_use]
pub fn drag_delta(pointer: Point, grab_offset: Point) -> Point {
    Point {
        x: pointer.x - grab_offset.x,
        y: pointer.y - grab_offset.y,
    }
}

/// New size for a resize from the bottom-right corner.
///
/// Returns `origin_size + (pointer_current - pointer_start)`. The result must
/// be passed through [`clamp_size`] before it is committed.
#[inline]
#[must_use]
pub fn resize_delta(pointer_start: Point, pointer_current: Point, origin_size: Size) -> Size {
    Size {
        width: origin_size.width + (pointer_current.x - pointer_start.x),
        height: origin_size.height + (pointer_current.y - pointer_start.y),
    }
}

/// Clamp a full rect: size first, then position against the (possibly
/// shrunken) size. This is the canonical re-clamp used on viewport resize.
#[must_use]
pub fn clamp_rect(rect: PanelRect, min: Size, max: Size, viewport: Viewport) -> PanelRect {
    let size = clamp_size(rect.size, min, max);
    PanelRect {
        origin: clamp_position(rect.origin, size, viewport),
        size,
    }
}
