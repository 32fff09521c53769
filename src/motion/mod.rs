//! Motion types and the goal-seeking steering laws

pub mod steering;

pub use steering::{PidSteering, ProportionalSteering, SteeringLaw, SteeringPhase};

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Navigation goal position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub x: f32,
    pub y: f32,
}

impl Goal {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// In-place turn direction, viewed from above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// Counter-clockwise
    Left,
    /// Clockwise
    Right,
}

/// Outcome of one goal-seeking controller iteration
#[derive(Debug, Clone, Copy)]
pub struct NavProgress {
    /// Euclidean distance to the goal at this cycle
    pub distance: f32,
    /// Normalized angular error toward the goal at this cycle
    pub heading_error: f32,
}

/// Spin until `condition` holds, optionally bounded by a deadline
///
/// The default `None` deadline reproduces the open-loop busy-wait of the
/// motion primitives: a condition that never becomes true blocks forever.
pub(crate) fn poll_until(
    deadline: Option<Duration>,
    mut condition: impl FnMut() -> bool,
) -> Result<()> {
    let start = Instant::now();
    while !condition() {
        if let Some(limit) = deadline {
            if start.elapsed() >= limit {
                return Err(Error::Timeout);
            }
        }
        std::thread::yield_now();
    }
    Ok(())
}
