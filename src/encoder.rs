//! Wheel encoder tick counters
//!
//! Two unsigned pulse counters, one per drive wheel, shared between the
//! control thread and asynchronous edge-handler contexts. Handlers get
//! increment-only [`TickHandle`]s; the control thread reads and resets
//! through the owning [`Platform`](crate::platform::Platform).
//!
//! Counts are magnitudes only: encoders cannot see rotation direction, so
//! the commanded wheel direction supplies the sign (see
//! [`Platform::update_pose`](crate::platform::Platform::update_pose)).
//!
//! Arithmetic wraps at `u32::MAX`. A wrap between two resets would require
//! 2^32 edges, far beyond any realistic tick rate, but the behavior is
//! defined rather than left to overflow checks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Drive wheel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

/// Shared left/right tick counters
#[derive(Debug, Default)]
pub struct TickCounters {
    left: AtomicU32,
    right: AtomicU32,
}

/// Increment-only handle for one wheel's counter
///
/// Cloneable and wait-free; intended to be invoked from an edge-triggered
/// handler. Never blocks, never allocates.
#[derive(Clone)]
pub struct TickHandle {
    counters: Arc<TickCounters>,
    wheel: Wheel,
}

impl TickCounters {
    /// Create a fresh counter pair at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, wheel: Wheel) -> &AtomicU32 {
        match wheel {
            Wheel::Left => &self.left,
            Wheel::Right => &self.right,
        }
    }

    /// Record one encoder edge
    ///
    /// Safe to call concurrently with [`read_and_reset`](Self::read_and_reset);
    /// every call adds exactly one count.
    pub fn increment(&self, wheel: Wheel) {
        self.cell(wheel).fetch_add(1, Ordering::Relaxed);
    }

    /// Atomically capture the current count and zero it
    ///
    /// The capture and the zeroing are one atomic exchange: an increment
    /// lands either in the returned value or in the fresh count, never in
    /// both and never in neither.
    pub fn read_and_reset(&self, wheel: Wheel) -> u32 {
        self.cell(wheel).swap(0, Ordering::Relaxed)
    }

    /// Read-and-reset both wheels
    ///
    /// Each wheel's exchange is atomic; the pair is not jointly atomic,
    /// matching the per-counter granularity of the hardware.
    pub fn read_and_reset_both(&self) -> (u32, u32) {
        (
            self.read_and_reset(Wheel::Left),
            self.read_and_reset(Wheel::Right),
        )
    }

    /// Read both counts without resetting (diagnostics)
    pub fn snapshot(&self) -> (u32, u32) {
        (
            self.left.load(Ordering::Relaxed),
            self.right.load(Ordering::Relaxed),
        )
    }

    /// Textual tick report for diagnostics: `"<left>, <right>"`
    ///
    /// Read-only; not consumed by the estimator.
    pub fn report(&self) -> String {
        let (left, right) = self.snapshot();
        format!("{}, {}", left, right)
    }

    /// Create an increment-only handle for edge-handler wiring
    pub fn handle(self: &Arc<Self>, wheel: Wheel) -> TickHandle {
        TickHandle {
            counters: Arc::clone(self),
            wheel,
        }
    }
}

impl TickHandle {
    /// Record one encoder edge on this handle's wheel
    pub fn increment(&self) {
        self.counters.increment(self.wheel);
    }
}
