#![forbid(unsafe_code)]

//! Dockwell Anim
//!
//! Animation primitives and the transition coordinator that moves the panel
//! between layout geometries.
//!
//! # Key Components
//!
//! - [`Animation`] - Tick-driven animation contract
//! - [`easing`] - Easing curves applied to animation progress
//! - [`GeometryTween`] - Interpolates one panel rect into another
//! - [`TransitionCoordinator`] - Drives a [`PanelSurface`] through a tween,
//!   with a wall-clock hard ceiling that force-commits a stuck transition
//!
//! # Role in Dockwell
//! This crate mutates presentation only: the coordinator pushes frames at a
//! [`PanelSurface`] and reports progress; committing the resulting layout
//! state is the state machine's job. That separation keeps "what is true"
//! apart from "what is currently being shown".

pub mod coordinator;
pub mod easing;
pub mod tween;

use std::time::Duration;

pub use coordinator::{PanelSurface, TransitionCoordinator, TransitionError, TransitionProgress};
pub use easing::{EasingFn, ease_in, ease_in_out, ease_out, linear};
pub use tween::GeometryTween;

/// A time-driven animation producing a scalar progress value.
///
/// Implementations advance on [`tick`](Animation::tick) and expose their
/// current value in `[0.0, 1.0]`.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current progress value in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Reset to the initial state.
    fn reset(&mut self);
}
