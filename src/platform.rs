//! The drive platform aggregate
//!
//! One [`Platform`] owns everything one robot needs for dead-reckoned
//! motion: the tick counters, the pose estimate, the per-wheel direction
//! state, the drive board, and the goal-seeking steering law. All pose
//! updates, controller iterations, and bus writes happen on the caller's
//! thread; only the tick counters are shared with edge-handler contexts.
//!
//! Multiple platforms (or simulated ones) can coexist: nothing here is
//! process-wide.

use crate::config::DriveConfig;
use crate::devices::driveboard::{DriveBoard, WheelCommand, WheelDirection};
use crate::encoder::{TickCounters, TickHandle, Wheel};
use crate::error::{Error, Result};
use crate::motion::steering::{goal_errors, PidSteering, SteeringLaw};
use crate::motion::{poll_until, Goal, NavProgress, TurnDirection};
use crate::odometry::{Odometry, Pose};
use crate::transport::Transport;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A differential-drive robot platform
pub struct Platform {
    config: DriveConfig,
    counters: Arc<TickCounters>,
    odometry: Odometry,
    board: DriveBoard,
    steering: Box<dyn SteeringLaw>,
    left_dir: WheelDirection,
    right_dir: WheelDirection,
    goal: Goal,
}

impl Platform {
    /// Create a platform over the given transport
    ///
    /// Pose starts at the origin with the configured initial heading; the
    /// canonical PID steering law is installed (see
    /// [`with_steering`](Self::with_steering) to swap it).
    pub fn new(config: DriveConfig, transport: Box<dyn Transport>) -> Self {
        let counters = Arc::new(TickCounters::new());
        let odometry = Odometry::new(
            config.platform.units_per_tick(),
            config.platform.track_width,
            Pose::new(0.0, 0.0, config.platform.initial_heading),
        );
        let board = DriveBoard::new(transport, config.limits.max_wheel_speed);
        let steering = Box::new(PidSteering::new(
            config.steering.clone(),
            config.limits.max_wheel_speed,
        ));

        log::info!(
            "Platform: initialized, initial heading {:.3}rad",
            config.platform.initial_heading
        );

        Self {
            config,
            counters,
            odometry,
            board,
            steering,
            left_dir: WheelDirection::Forward,
            right_dir: WheelDirection::Forward,
            goal: Goal::new(0.0, 0.0),
        }
    }

    /// Replace the goal-seeking steering law
    pub fn with_steering(mut self, steering: Box<dyn SteeringLaw>) -> Self {
        self.steering = steering;
        self
    }

    /// Shared tick counters (for wiring and diagnostics)
    pub fn counters(&self) -> &Arc<TickCounters> {
        &self.counters
    }

    /// Increment-only handle for one wheel, to attach to an edge handler
    pub fn tick_handle(&self, wheel: Wheel) -> TickHandle {
        self.counters.handle(wheel)
    }

    /// Current pose estimate (as of the last [`update_pose`](Self::update_pose))
    pub fn pose(&self) -> Pose {
        self.odometry.pose()
    }

    /// Active goal position
    pub fn goal(&self) -> Goal {
        self.goal
    }

    /// Platform configuration
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// Fold the ticks accumulated since the last update into the pose
    ///
    /// Reads and resets both counters, signs each delta by the wheel's
    /// currently commanded direction, and integrates. Must run before any
    /// decision that depends on the pose; every operation on this type
    /// that needs it calls it itself.
    pub fn update_pose(&mut self) -> Pose {
        let (left, right) = self.counters.read_and_reset_both();
        self.odometry.apply_ticks(
            signed_ticks(left, self.left_dir),
            signed_ticks(right, self.right_dir),
        )
    }

    /// Command per-wheel speeds and directions
    ///
    /// If a commanded direction differs from the recorded one, the pending
    /// tick delta is committed first so ticks traveled under the old
    /// direction keep their sign. The frame then goes out as one bus
    /// transaction.
    pub fn set_wheel_speeds(&mut self, command: WheelCommand) -> Result<()> {
        if command.left_dir != self.left_dir || command.right_dir != self.right_dir {
            self.update_pose();
        }
        self.left_dir = command.left_dir;
        self.right_dir = command.right_dir;
        self.board.set_wheel_speeds(command)
    }

    /// Stop both wheels
    pub fn stop(&mut self) -> Result<()> {
        self.set_wheel_speeds(WheelCommand::stop())
    }

    /// Read the drive board status byte (blocks until one arrives)
    pub fn status(&mut self) -> Result<u8> {
        self.board.status()
    }

    /// Read the drive board status byte with a deadline
    pub fn status_deadline(&mut self, deadline: Duration) -> Result<u8> {
        self.board.status_deadline(deadline)
    }

    /// Drive both wheels `direction` until the average tick count reaches
    /// `target_ticks`, then stop
    ///
    /// Blocking and uninterruptible, with no timeout: a stalled wheel
    /// blocks forever. Use
    /// [`drive_ticks_deadline`](Self::drive_ticks_deadline) where that is
    /// unacceptable.
    pub fn drive_ticks(
        &mut self,
        target_ticks: u32,
        speed: u16,
        direction: WheelDirection,
    ) -> Result<()> {
        let command = WheelCommand::new(speed, direction, speed, direction);
        self.run_ticks(target_ticks, command, None)
    }

    /// [`drive_ticks`](Self::drive_ticks) with a deadline
    ///
    /// On expiry the motors are stopped and [`Error::Timeout`] is returned.
    pub fn drive_ticks_deadline(
        &mut self,
        target_ticks: u32,
        speed: u16,
        direction: WheelDirection,
        deadline: Duration,
    ) -> Result<()> {
        let command = WheelCommand::new(speed, direction, speed, direction);
        self.run_ticks(target_ticks, command, Some(deadline))
    }

    /// Rotate in place until the average tick count reaches `target_ticks`
    ///
    /// The left wheel runs opposite the requested turn direction, the
    /// right wheel with it. Same blocking contract as
    /// [`drive_ticks`](Self::drive_ticks).
    pub fn turn_ticks(
        &mut self,
        target_ticks: u32,
        speed: u16,
        turn: TurnDirection,
    ) -> Result<()> {
        let (left_dir, right_dir) = turn_wheel_dirs(turn);
        let command = WheelCommand::new(speed, left_dir, speed, right_dir);
        self.run_ticks(target_ticks, command, None)
    }

    /// [`turn_ticks`](Self::turn_ticks) with a deadline
    pub fn turn_ticks_deadline(
        &mut self,
        target_ticks: u32,
        speed: u16,
        turn: TurnDirection,
        deadline: Duration,
    ) -> Result<()> {
        let (left_dir, right_dir) = turn_wheel_dirs(turn);
        let command = WheelCommand::new(speed, left_dir, speed, right_dir);
        self.run_ticks(target_ticks, command, Some(deadline))
    }

    fn run_ticks(
        &mut self,
        target_ticks: u32,
        command: WheelCommand,
        deadline: Option<Duration>,
    ) -> Result<()> {
        self.update_pose();
        self.set_wheel_speeds(command)?;
        self.counters.read_and_reset_both();

        let counters = Arc::clone(&self.counters);
        let target = target_ticks as u64;
        let reached = poll_until(deadline, move || {
            let (left, right) = counters.snapshot();
            (left as u64 + right as u64) / 2 >= target
        });

        self.stop()?;
        reached
    }

    /// Set a new goal position, clearing accumulated steering state
    pub fn set_goal(&mut self, x: f32, y: f32) {
        self.goal = Goal::new(x, y);
        self.steering.reset();
        log::info!("Platform: goal set to ({:.2}, {:.2})", x, y);
    }

    /// Euclidean distance from the current pose estimate to the goal
    pub fn distance_to_goal(&self) -> f32 {
        goal_errors(self.odometry.pose(), self.goal).0
    }

    /// Run one goal-seeking controller iteration
    ///
    /// Updates the pose, computes and issues the steering command, and
    /// reports this cycle's errors. The caller loops this until
    /// `distance` drops below the arrival tolerance, then calls
    /// [`stop`](Self::stop), or uses [`seek_goal`](Self::seek_goal).
    pub fn goal_step(&mut self) -> Result<NavProgress> {
        let pose = self.update_pose();
        let goal = self.goal;
        let (distance, heading_error) = goal_errors(pose, goal);

        let command = self.steering.step(pose, goal);
        self.set_wheel_speeds(command)?;

        Ok(NavProgress {
            distance,
            heading_error,
        })
    }

    /// Iterate the controller until arrival, then stop
    ///
    /// `deadline: None` preserves the unbounded contract: the loop runs
    /// until the goal is reached, however long that takes. With a
    /// deadline, expiry stops the motors and returns [`Error::Timeout`].
    pub fn seek_goal(&mut self, deadline: Option<Duration>) -> Result<()> {
        let start = Instant::now();
        let tolerance = self.config.steering.arrival_tolerance;

        loop {
            let progress = self.goal_step()?;
            if progress.distance < tolerance {
                log::info!(
                    "Platform: goal reached (distance {:.3} < tolerance {:.3})",
                    progress.distance,
                    tolerance
                );
                break;
            }

            if let Some(limit) = deadline {
                if start.elapsed() >= limit {
                    self.stop()?;
                    log::warn!("Platform: goal seek timed out after {:?}", limit);
                    return Err(Error::Timeout);
                }
            }
            std::thread::yield_now();
        }

        self.stop()
    }
}

/// Sign an unsigned tick magnitude by the commanded wheel direction
fn signed_ticks(ticks: u32, direction: WheelDirection) -> i32 {
    let ticks = ticks.min(i32::MAX as u32) as i32;
    match direction {
        WheelDirection::Forward => ticks,
        WheelDirection::Reverse => -ticks,
    }
}

/// Wheel directions for an in-place turn: left wheel opposite the turn,
/// right wheel with it
fn turn_wheel_dirs(turn: TurnDirection) -> (WheelDirection, WheelDirection) {
    match turn {
        TurnDirection::Right => (WheelDirection::Forward, WheelDirection::Reverse),
        TurnDirection::Left => (WheelDirection::Reverse, WheelDirection::Forward),
    }
}
