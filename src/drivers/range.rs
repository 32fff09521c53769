//! Ultrasonic ranging sensor interface
//!
//! External collaborator to the motion core: the sensor triggers a timed
//! pulse and measures the echo pulse width. The returned value is raw
//! elapsed time; converting to distance (speed of sound, medium, round
//! trip) is the caller's business.

use crate::error::Result;
use std::time::Duration;

/// Blocking single-shot ranging sensor
pub trait RangeSensor: Send {
    /// Trigger one ranging pulse and return the echo pulse duration
    ///
    /// Purely synchronous; implementations hold no state between pings.
    fn ping(&mut self) -> Result<Duration>;
}
