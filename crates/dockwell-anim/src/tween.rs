#![forbid(unsafe_code)]

//! Geometry tween: interpolates one panel rect into another.
//!
//! # Invariants
//!
//! 1. `value()` is eased progress in `[0.0, 1.0]`.
//! 2. Once complete, [`frame`](GeometryTween::frame) returns the target rect
//!    exactly — the final frame snaps to `to` with no residual sub-pixel
//!    drift.
//! 3. A zero duration is clamped to 1ns, so progress is defined everywhere.

use std::time::Duration;

use dockwell_core::geometry::{PanelRect, Point, Size};

use crate::easing::{EasingFn, ease_out};
use crate::Animation;

/// Interpolates position and size between two panel rects over a duration.
#[derive(Debug, Clone)]
pub struct GeometryTween {
    from: PanelRect,
    to: PanelRect,
    duration: Duration,
    easing: EasingFn,
    elapsed: Duration,
}

impl GeometryTween {
    /// Create a tween with the default ease-out curve.
    ///
    /// A zero duration is clamped to 1ns to avoid division by zero.
    #[must_use]
    pub fn new(from: PanelRect, to: PanelRect, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: ease_out,
            elapsed: Duration::ZERO,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// The target rect.
    #[inline]
    #[must_use]
    pub const fn to(&self) -> PanelRect {
        self.to
    }

    /// The origin rect.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> PanelRect {
        self.from
    }

    /// The nominal duration.
    #[inline]
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// The rect to display at the current progress.
    ///
    /// Returns `to` exactly once the tween is complete.
    #[must_use]
    pub fn frame(&self) -> PanelRect {
        if self.is_complete() {
            return self.to;
        }
        let t = self.value();
        PanelRect {
            origin: Point::new(
                lerp(self.from.origin.x, self.to.origin.x, t),
                lerp(self.from.origin.y, self.to.origin.y, t),
            ),
            size: Size::new(
                lerp(self.from.size.width, self.to.size.width, t),
                lerp(self.from.size.height, self.to.size.height, t),
            ),
        }
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Animation for GeometryTween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        let t = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32;
        (self.easing)(t)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
