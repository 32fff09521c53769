//! Dead-reckoning pose estimation from wheel tick deltas
//!
//! Integrates signed per-wheel tick deltas through the differential drive
//! model. The estimate is Markov: each update depends only on the previous
//! pose and the delta since the last update.

use std::f32::consts::PI;
use std::time::{Duration, Instant};

/// 2D pose (position and orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Heading in radians, normalized to (-pi, pi]
    pub heading: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }
}

/// Normalize an angle into (-pi, pi]
///
/// Closed form: terminates for any finite input, unlike repeated +/- 2pi
/// adjustment which degrades for extreme magnitudes.
#[inline]
pub fn normalize_angle(theta: f32) -> f32 {
    let wrapped = (theta + PI).rem_euclid(2.0 * PI);
    if wrapped == 0.0 {
        PI
    } else {
        wrapped - PI
    }
}

/// Differential-drive pose integrator
pub struct Odometry {
    /// Linear distance per encoder tick
    units_per_tick: f32,
    /// Distance between the drive wheels
    track_width: f32,
    pose: Pose,
    /// Last pose log time (for throttling)
    last_pose_log: Option<Instant>,
}

impl Odometry {
    pub fn new(units_per_tick: f32, track_width: f32, initial: Pose) -> Self {
        log::debug!(
            "Odometry: initialized with units_per_tick={:.4}, track_width={:.2}",
            units_per_tick,
            track_width
        );

        Self {
            units_per_tick,
            track_width,
            pose: initial,
            last_pose_log: None,
        }
    }

    /// Integrate one signed tick delta per wheel into the pose
    ///
    /// Position advances along the pre-update heading; the heading then
    /// turns by the wheel travel difference over the track width and is
    /// re-normalized. Zero deltas leave the pose exactly unchanged.
    pub fn apply_ticks(&mut self, left_ticks: i32, right_ticks: i32) -> Pose {
        if left_ticks == 0 && right_ticks == 0 {
            return self.pose;
        }

        let left = left_ticks as f32 * self.units_per_tick;
        let right = right_ticks as f32 * self.units_per_tick;

        let forward = (left + right) / 2.0;
        self.pose.x += forward * self.pose.heading.cos();
        self.pose.y += forward * self.pose.heading.sin();
        self.pose.heading =
            normalize_angle(self.pose.heading + (right - left) / self.track_width);

        let should_log = match self.last_pose_log {
            Some(last) => last.elapsed() >= Duration::from_secs(1),
            None => true,
        };
        if should_log {
            log::debug!(
                "Odometry: dL={}, dR={}, pose=({:.2}, {:.2}, {:.3}rad)",
                left_ticks,
                right_ticks,
                self.pose.x,
                self.pose.y,
                self.pose.heading
            );
            self.last_pose_log = Some(Instant::now());
        }

        self.pose
    }

    /// Current pose estimate
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Overwrite the pose estimate (re-zeroing, test setup)
    pub fn reset(&mut self, pose: Pose) {
        log::debug!(
            "Odometry: reset to ({:.2}, {:.2}, {:.3}rad)",
            pose.x,
            pose.y,
            pose.heading
        );
        self.pose = pose;
        self.last_pose_log = None;
    }
}
