//! Goal-seeking steering laws
//!
//! A steering law turns (current pose, goal) into one per-wheel command.
//! It is an iterated step function, not a planner: the caller loops it and
//! decides termination against the arrival tolerance.
//!
//! Two laws are provided. [`PidSteering`] is the canonical one: each cycle
//! it re-selects between rotate-in-place and advance-with-steering-bias
//! from the current error magnitudes, with integral and derivative terms on
//! both heading error and distance. [`ProportionalSteering`] is a simpler
//! alternative with no internal state.

use crate::config::SteeringConfig;
use crate::devices::driveboard::{WheelCommand, WheelDirection};
use crate::motion::Goal;
use crate::odometry::{normalize_angle, Pose};

/// Behavior selected by [`PidSteering`] on a given cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteeringPhase {
    /// Rotating in place to face the goal
    Rotate,
    /// Advancing toward the goal with a steering bias
    Advance,
}

/// A feedback law mapping (pose, goal) to a wheel command
pub trait SteeringLaw: Send {
    /// Compute the command for one control cycle
    fn step(&mut self, pose: Pose, goal: Goal) -> WheelCommand;

    /// Clear accumulated error state (called when a new goal is set)
    fn reset(&mut self);
}

/// Distance and normalized heading error from `pose` toward `goal`
pub(crate) fn goal_errors(pose: Pose, goal: Goal) -> (f32, f32) {
    let dx = goal.x - pose.x;
    let dy = goal.y - pose.y;
    let distance = dx.hypot(dy);
    let heading_error = normalize_angle(dy.atan2(dx) - pose.heading);
    (distance, heading_error)
}

fn clamp_speed(value: f32, max_wheel_speed: u16) -> u16 {
    value.clamp(0.0, max_wheel_speed as f32) as u16
}

/// PID rotate/advance steering law
///
/// The phase is re-evaluated every cycle from the current errors; there is
/// no persistent mode. Far from the goal with a large heading error the
/// robot pivots in place; otherwise it advances with a heading-proportional
/// speed bias between the wheels. When the bias exceeds the forward speed,
/// the slow wheel is floored at zero and the fast wheel absorbs the excess
/// rather than reversing the slow wheel.
pub struct PidSteering {
    config: SteeringConfig,
    max_wheel_speed: u16,
    heading_integral: f32,
    distance_integral: f32,
    prev_heading_error: f32,
    prev_distance: f32,
    last_phase: Option<SteeringPhase>,
}

impl PidSteering {
    pub fn new(config: SteeringConfig, max_wheel_speed: u16) -> Self {
        Self {
            config,
            max_wheel_speed,
            heading_integral: 0.0,
            distance_integral: 0.0,
            prev_heading_error: 0.0,
            prev_distance: 0.0,
            last_phase: None,
        }
    }

    /// Phase chosen by the most recent [`step`](SteeringLaw::step), if any
    pub fn last_phase(&self) -> Option<SteeringPhase> {
        self.last_phase
    }

    fn enter_phase(&mut self, phase: SteeringPhase) {
        if self.last_phase != Some(phase) {
            log::debug!("PidSteering: {:?}", phase);
        }
        self.last_phase = Some(phase);
    }
}

impl SteeringLaw for PidSteering {
    fn step(&mut self, pose: Pose, goal: Goal) -> WheelCommand {
        let (distance, heading_error) = goal_errors(pose, goal);

        self.heading_integral += heading_error;
        self.distance_integral += distance;
        let delta_heading = heading_error - self.prev_heading_error;
        let delta_distance = distance - self.prev_distance;

        let command = if heading_error.abs() > self.config.heading_threshold
            && distance > self.config.min_approach_distance
        {
            self.enter_phase(SteeringPhase::Rotate);

            let turn = self.config.heading.kp * heading_error
                + self.config.heading.ki * self.heading_integral
                + self.config.heading.kd * delta_heading;
            let speed = clamp_speed(turn.abs(), self.max_wheel_speed);

            if heading_error > 0.0 {
                // goal lies counter-clockwise: left wheel back, right forward
                WheelCommand::new(
                    speed,
                    WheelDirection::Reverse,
                    speed,
                    WheelDirection::Forward,
                )
            } else {
                WheelCommand::new(
                    speed,
                    WheelDirection::Forward,
                    speed,
                    WheelDirection::Reverse,
                )
            }
        } else {
            self.enter_phase(SteeringPhase::Advance);

            let base = (self.config.distance.kp * distance
                + self.config.distance.ki * self.distance_integral
                + self.config.distance.kd * delta_distance)
                .clamp(0.0, self.max_wheel_speed as f32);
            let turn = self.config.steering_gain * heading_error;

            let (left, right) = if turn.abs() > base {
                // Saturated turn: floor the slow wheel at zero, the fast
                // wheel absorbs the excess
                if turn > 0.0 {
                    (0.0, base + turn)
                } else {
                    (base - turn, 0.0)
                }
            } else {
                (base - turn, base + turn)
            };

            WheelCommand::new(
                clamp_speed(left, self.max_wheel_speed),
                WheelDirection::Forward,
                clamp_speed(right, self.max_wheel_speed),
                WheelDirection::Forward,
            )
        };

        self.prev_heading_error = heading_error;
        self.prev_distance = distance;
        command
    }

    fn reset(&mut self) {
        self.heading_integral = 0.0;
        self.distance_integral = 0.0;
        self.prev_heading_error = 0.0;
        self.prev_distance = 0.0;
        self.last_phase = None;
    }
}

/// Proportional-only steering law
///
/// Normalized forward speed with a heading-proportional turn rate split
/// across the wheels. A wheel whose blended velocity comes out negative is
/// driven in reverse. Stateless between cycles.
pub struct ProportionalSteering {
    k_distance: f32,
    k_turn: f32,
    track_width: f32,
    max_wheel_speed: u16,
}

impl ProportionalSteering {
    pub fn new(config: &SteeringConfig, track_width: f32, max_wheel_speed: u16) -> Self {
        Self {
            k_distance: config.p_distance_gain,
            k_turn: config.p_turn_gain,
            track_width,
            max_wheel_speed,
        }
    }

    fn wheel(&self, velocity: f32) -> (u16, WheelDirection) {
        let direction = if velocity < 0.0 {
            WheelDirection::Reverse
        } else {
            WheelDirection::Forward
        };
        let speed = clamp_speed(
            velocity.abs() * self.max_wheel_speed as f32,
            self.max_wheel_speed,
        );
        (speed, direction)
    }
}

impl SteeringLaw for ProportionalSteering {
    fn step(&mut self, pose: Pose, goal: Goal) -> WheelCommand {
        let (distance, heading_error) = goal_errors(pose, goal);

        let speed = (self.k_distance * distance).min(1.0);
        let turn = self.k_turn * heading_error;

        let (left_speed, left_dir) = self.wheel(speed - turn * self.track_width / 2.0);
        let (right_speed, right_dir) = self.wheel(speed + turn * self.track_width / 2.0);

        WheelCommand::new(left_speed, left_dir, right_speed, right_dir)
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PidGains;
    use std::f32::consts::FRAC_PI_2;

    // Test-tuned gains: wheel speeds are u16, so gains must be large
    // enough that small errors still map to non-zero speed commands
    fn test_config() -> SteeringConfig {
        SteeringConfig {
            heading: PidGains {
                kp: 300.0,
                ki: 0.0,
                kd: 0.2,
            },
            distance: PidGains {
                kp: 2.0,
                ki: 0.0,
                kd: 0.0,
            },
            steering_gain: 20.0,
            heading_threshold: 0.05,
            min_approach_distance: 1.0,
            arrival_tolerance: 0.5,
            p_distance_gain: 1.0,
            p_turn_gain: 0.1,
        }
    }

    const TRACK_WIDTH: f32 = 17.0;
    const MAX_SPEED: u16 = 500;
    /// Distance units moved per speed unit per control cycle in the
    /// closed-loop simulation below
    const SPEED_SCALE: f32 = 0.0005;

    fn signed(speed: u16, dir: WheelDirection) -> f32 {
        let v = speed as f32 * SPEED_SCALE;
        match dir {
            WheelDirection::Forward => v,
            WheelDirection::Reverse => -v,
        }
    }

    fn integrate(pose: &mut Pose, command: WheelCommand) {
        let left = signed(command.left_speed, command.left_dir);
        let right = signed(command.right_speed, command.right_dir);
        let forward = (left + right) / 2.0;
        pose.x += forward * pose.heading.cos();
        pose.y += forward * pose.heading.sin();
        pose.heading = normalize_angle(pose.heading + (right - left) / TRACK_WIDTH);
    }

    #[test]
    fn test_first_cycle_rotates_toward_goal() {
        let mut law = PidSteering::new(test_config(), MAX_SPEED);
        let pose = Pose::new(0.0, 0.0, FRAC_PI_2);
        let goal = Goal::new(10.0, 0.0);

        let (_, heading_error) = goal_errors(pose, goal);
        assert!((heading_error + FRAC_PI_2).abs() < 1e-3);

        let command = law.step(pose, goal);
        assert_eq!(law.last_phase(), Some(SteeringPhase::Rotate));

        // Negative heading error: clockwise pivot, left forward, right back
        assert_eq!(command.left_dir, WheelDirection::Forward);
        assert_eq!(command.right_dir, WheelDirection::Reverse);
        assert_eq!(command.left_speed, command.right_speed);
        assert!(command.left_speed > 0);
    }

    #[test]
    fn test_rotation_direction_follows_error_sign() {
        let mut law = PidSteering::new(test_config(), MAX_SPEED);

        // Goal counter-clockwise from the heading
        let command = law.step(Pose::new(0.0, 0.0, 0.0), Goal::new(0.0, 10.0));
        assert_eq!(law.last_phase(), Some(SteeringPhase::Rotate));
        assert_eq!(command.left_dir, WheelDirection::Reverse);
        assert_eq!(command.right_dir, WheelDirection::Forward);
    }

    #[test]
    fn test_saturated_turn_floors_slow_wheel_at_zero() {
        let mut config = test_config();
        config.steering_gain = 5000.0;
        let mut law = PidSteering::new(config, MAX_SPEED);

        // Small positive heading error, below the rotate threshold
        let command = law.step(Pose::new(0.0, 0.0, 0.0), Goal::new(10.0, 0.2));
        assert_eq!(law.last_phase(), Some(SteeringPhase::Advance));
        assert_eq!(command.left_speed, 0);
        assert!(command.right_speed > 0);
        assert_eq!(command.left_dir, WheelDirection::Forward);
        assert_eq!(command.right_dir, WheelDirection::Forward);

        // Mirrored for a negative error
        law.reset();
        let command = law.step(Pose::new(0.0, 0.0, 0.0), Goal::new(10.0, -0.2));
        assert_eq!(command.right_speed, 0);
        assert!(command.left_speed > 0);
    }

    #[test]
    fn test_unsaturated_advance_biases_wheels() {
        let mut law = PidSteering::new(test_config(), MAX_SPEED);

        let command = law.step(Pose::new(0.0, 0.0, 0.0), Goal::new(10.0, 0.2));
        assert_eq!(law.last_phase(), Some(SteeringPhase::Advance));

        // Positive error: right wheel faster, both forward
        assert!(command.right_speed > command.left_speed);
        assert!(command.left_speed > 0);
        assert_eq!(command.left_dir, WheelDirection::Forward);
        assert_eq!(command.right_dir, WheelDirection::Forward);
    }

    #[test]
    fn test_reset_clears_accumulated_state() {
        let mut config = test_config();
        config.heading.ki = 0.4;
        let mut law = PidSteering::new(config, MAX_SPEED);
        let pose = Pose::new(0.0, 0.0, FRAC_PI_2);
        let goal = Goal::new(10.0, 0.0);

        let first = law.step(pose, goal);
        law.step(pose, goal);
        law.step(pose, goal);

        law.reset();
        assert_eq!(law.last_phase(), None);
        let after_reset = law.step(pose, goal);

        // With the integral cleared, the first command repeats exactly
        assert_eq!(first, after_reset);
    }

    #[test]
    fn test_rotate_then_advance_converges() {
        let mut law = PidSteering::new(test_config(), MAX_SPEED);
        let mut pose = Pose::new(0.0, 0.0, FRAC_PI_2);
        let goal = Goal::new(10.0, 0.0);

        let mut advancing = false;
        let mut prev_distance = f32::MAX;
        let mut arrived = false;

        for _ in 0..20_000 {
            let (distance, _) = goal_errors(pose, goal);
            if distance < test_config().arrival_tolerance {
                arrived = true;
                break;
            }

            let command = law.step(pose, goal);

            if law.last_phase() == Some(SteeringPhase::Advance) {
                advancing = true;
            }
            if advancing {
                // Once advancing, distance never grows beyond gain jitter
                assert!(
                    distance <= prev_distance + 1e-3,
                    "distance grew: {} -> {}",
                    prev_distance,
                    distance
                );
            }
            prev_distance = distance;

            integrate(&mut pose, command);
        }

        assert!(advancing, "controller never left the rotate phase");
        assert!(arrived, "controller did not reach the goal");
    }

    #[test]
    fn test_proportional_law_straight_ahead() {
        let config = test_config();
        let mut law = ProportionalSteering::new(&config, TRACK_WIDTH, MAX_SPEED);

        let command = law.step(Pose::new(0.0, 0.0, 0.0), Goal::new(0.5, 0.0));

        // Goal dead ahead at half the normalization distance
        assert_eq!(command.left_speed, command.right_speed);
        assert_eq!(command.left_speed, 250);
        assert_eq!(command.left_dir, WheelDirection::Forward);
    }

    #[test]
    fn test_proportional_law_reverses_inner_wheel_on_hard_turn() {
        let config = test_config();
        let mut law = ProportionalSteering::new(&config, TRACK_WIDTH, MAX_SPEED);

        // Goal directly behind: a hard left arc
        let command = law.step(Pose::new(0.0, 0.0, 0.0), Goal::new(-10.0, 0.0));

        assert_eq!(command.left_dir, WheelDirection::Reverse);
        assert_eq!(command.right_dir, WheelDirection::Forward);
        assert!(command.right_speed > 0);
    }
}
