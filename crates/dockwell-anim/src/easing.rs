#![forbid(unsafe_code)]

//! Easing curves applied to animation progress.
//!
//! Each function maps linear progress `t` in `[0.0, 1.0]` to eased progress
//! in the same range, with `f(0) = 0` and `f(1) = 1`. Inputs outside the
//! range are clamped first, so the functions are total.

/// An easing function applied to linear progress.
pub type EasingFn = fn(f32) -> f32;

#[inline]
fn clamp01(t: f32) -> f32 {
    if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
}

/// Identity easing.
#[must_use]
pub fn linear(t: f32) -> f32 {
    clamp01(t)
}

/// Cubic ease-in: slow start, fast finish.
#[must_use]
pub fn ease_in(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * t
}

/// Cubic ease-out: fast start, slow finish. The default for panel movement.
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = clamp01(t);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Cubic ease-in-out: slow at both ends.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = clamp01(t);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let inv = -2.0 * t + 2.0;
        1.0 - inv * inv * inv / 2.0
    }
}
