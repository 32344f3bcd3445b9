#![forbid(unsafe_code)]

//! Transition coordinator: drives a host surface between two geometries.
//!
//! The coordinator owns at most one in-flight transition. Each call to
//! [`tick`](TransitionCoordinator::tick) advances the tween, pushes a frame
//! at the [`PanelSurface`], and reports progress. The coordinator never
//! mutates layout state; the caller commits the variant change when the
//! coordinator reports [`TransitionProgress::Completed`] or
//! [`TransitionProgress::ForceCommit`], or when `tick` returns an error.
//!
//! # Invariants
//!
//! 1. At most one transition is active; [`begin`](TransitionCoordinator::begin)
//!    while active replaces it (the caller's lock prevents this in practice).
//! 2. On natural completion the surface has been driven to the target rect
//!    exactly.
//! 3. A detached surface yields `Err(TransitionError::Detached)` and clears
//!    the transition — an error return, never a panic.
//! 4. A transition that outlives its wall-clock deadline (nominal duration ×
//!    ceiling factor) yields `ForceCommit` even if no frames advanced, so a
//!    hung frame source cannot hold the transition lock forever.

use std::time::Duration;

use dockwell_core::geometry::PanelRect;
use web_time::Instant;

use crate::easing::EasingFn;
use crate::tween::GeometryTween;
use crate::Animation;

/// The host-side handle the coordinator animates.
///
/// This is the presentation boundary: a DOM node wrapper, a compositor
/// layer, or a test double. Implementations only reflect geometry; they hold
/// no layout truth.
pub trait PanelSurface {
    /// Whether the underlying handle is still attached and paintable.
    fn is_attached(&self) -> bool;

    /// Display the panel at the given rect.
    fn apply_geometry(&mut self, rect: PanelRect);

    /// Acquire or release pointer capture on the host.
    fn set_pointer_capture(&mut self, active: bool);
}

/// Failure modes of a transition tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The surface handle is detached; the caller should fall back to an
    /// instantaneous state commit.
    Detached,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detached => write!(f, "panel surface is detached"),
        }
    }
}

impl std::error::Error for TransitionError {}

/// Progress report from a transition tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionProgress {
    /// No transition is in flight.
    Idle,
    /// A frame was applied; the transition continues.
    Animating,
    /// The final frame was applied; the caller commits the variant change.
    Completed,
    /// The hard ceiling elapsed; the caller commits without animation.
    ForceCommit,
}

#[derive(Debug)]
struct ActiveTransition {
    tween: GeometryTween,
    deadline: Instant,
}

/// Drives at most one geometry transition at a time.
#[derive(Debug, Default)]
pub struct TransitionCoordinator {
    active: Option<ActiveTransition>,
}

impl TransitionCoordinator {
    /// Create an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Whether a transition is in flight.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Target rect of the in-flight transition, if any.
    #[must_use]
    pub fn target(&self) -> Option<PanelRect> {
        self.active.as_ref().map(|a| a.tween.to())
    }

    /// Arm a transition from `from` to `to`.
    ///
    /// The wall-clock deadline is `duration × ceiling_factor`; past it,
    /// `tick` reports [`TransitionProgress::ForceCommit`] regardless of how
    /// much tween time has accumulated.
    pub fn begin(
        &mut self,
        from: PanelRect,
        to: PanelRect,
        duration: Duration,
        easing: EasingFn,
        ceiling_factor: u32,
        now: Instant,
    ) {
        let tween = GeometryTween::new(from, to, duration).easing(easing);
        let ceiling = tween.duration().saturating_mul(ceiling_factor.max(1));
        self.active = Some(ActiveTransition {
            tween,
            deadline: now + ceiling,
        });
    }

    /// Drop the in-flight transition without completing it.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Advance the transition by `dt` and push a frame at the surface.
    ///
    /// `now` is wall-clock time, checked against the hard deadline before
    /// any tween time is applied. On `Completed`, `ForceCommit`, or error
    /// the coordinator returns to idle.
    pub fn tick(
        &mut self,
        dt: Duration,
        now: Instant,
        surface: &mut dyn PanelSurface,
    ) -> Result<TransitionProgress, TransitionError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(TransitionProgress::Idle);
        };

        if !surface.is_attached() {
            self.active = None;
            return Err(TransitionError::Detached);
        }

        if now >= active.deadline {
            self.active = None;
            return Ok(TransitionProgress::ForceCommit);
        }

        active.tween.tick(dt);
        let frame = active.tween.frame();
        surface.apply_geometry(frame);

        if active.tween.is_complete() {
            self.active = None;
            Ok(TransitionProgress::Completed)
        } else {
            Ok(TransitionProgress::Animating)
        }
    }
}
