#![forbid(unsafe_code)]

//! RAII pointer-capture guard.
//!
//! Global pointer listeners must be attached only while a drag or resize is
//! active and released on every exit path, including the panel unmounting
//! mid-drag. The acquire/release pair is expressed as a guard object: the
//! capture flag is set on [`PointerGrab::acquire`] and cleared when the
//! guard drops, however it drops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, host-observable view of whether a grab is active.
///
/// The embedding host attaches its global pointer listeners while the flag
/// is set and detaches them when it clears.
#[derive(Debug, Clone, Default)]
pub struct CaptureFlag {
    active: Arc<AtomicBool>,
}

impl CaptureFlag {
    /// Create an inactive flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a grab currently holds the flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// An active pointer grab. Dropping it releases the capture.
#[derive(Debug)]
pub struct PointerGrab {
    flag: Arc<AtomicBool>,
}

impl PointerGrab {
    /// Acquire the grab, setting the shared flag.
    #[must_use]
    pub fn acquire(flag: &CaptureFlag) -> Self {
        flag.active.store(true, Ordering::Release);
        Self {
            flag: Arc::clone(&flag.active),
        }
    }
}

impl Drop for PointerGrab {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
