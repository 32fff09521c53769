//! Configuration for the drive platform
//!
//! Loads configuration from a TOML file. Geometry defaults carry the
//! calibration of the reference chassis (72-tick encoders on 7.5-unit
//! wheels, 17.0-unit track width); steering gains are tuning values, not
//! verified hardware truths, and should be adjusted per robot.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fs;
use std::path::Path;

/// Top-level drive configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    pub platform: PlatformConfig,
    pub limits: LimitsConfig,
    pub steering: SteeringConfig,
}

/// Chassis geometry and encoder calibration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformConfig {
    /// Encoder ticks per full wheel revolution
    pub ticks_per_revolution: u32,
    /// Wheel diameter (any length unit, shared by all lengths in the config)
    pub wheel_diameter: f32,
    /// Distance between the two drive wheels
    pub track_width: f32,
    /// Assumed starting orientation (radians)
    pub initial_heading: f32,
}

/// Actuation limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum per-wheel speed accepted by the drive board
    pub max_wheel_speed: u16,
}

/// PID gain triple
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// Goal-seeking controller gains and thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SteeringConfig {
    /// Heading-error PID (rotate-in-place behavior)
    pub heading: PidGains,
    /// Distance PID (forward speed while advancing)
    pub distance: PidGains,
    /// Heading-error to steering-bias gain while advancing
    pub steering_gain: f32,
    /// Heading error (radians) above which the controller rotates in place
    pub heading_threshold: f32,
    /// Distance below which rotate-in-place is suppressed
    pub min_approach_distance: f32,
    /// Distance below which the goal counts as reached
    pub arrival_tolerance: f32,
    /// Distance-to-speed gain of the proportional-only law
    pub p_distance_gain: f32,
    /// Heading-error-to-turn-rate gain of the proportional-only law
    pub p_turn_gain: f32,
}

impl PlatformConfig {
    /// Linear distance traveled per encoder tick
    pub fn units_per_tick(&self) -> f32 {
        PI * self.wheel_diameter / self.ticks_per_revolution as f32
    }
}

impl DriveConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DriveConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject geometry that would make the kinematics degenerate
    pub fn validate(&self) -> Result<()> {
        if self.platform.ticks_per_revolution == 0 {
            return Err(Error::InvalidParameter(
                "ticks_per_revolution must be non-zero".to_string(),
            ));
        }
        if self.platform.wheel_diameter <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "wheel_diameter must be positive, got {}",
                self.platform.wheel_diameter
            )));
        }
        if self.platform.track_width <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "track_width must be positive, got {}",
                self.platform.track_width
            )));
        }
        if self.steering.arrival_tolerance <= 0.0 {
            return Err(Error::InvalidParameter(
                "arrival_tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            platform: PlatformConfig {
                ticks_per_revolution: 72,
                wheel_diameter: 7.5,
                track_width: 17.0,
                initial_heading: FRAC_PI_2,
            },
            limits: LimitsConfig {
                max_wheel_speed: 1000,
            },
            steering: SteeringConfig {
                heading: PidGains {
                    kp: 3.0,
                    ki: 0.4,
                    kd: 0.2,
                },
                distance: PidGains {
                    kp: 0.5,
                    ki: 0.01,
                    kd: 0.0,
                },
                steering_gain: 150.0,
                heading_threshold: 0.05,
                min_approach_distance: 15.0,
                arrival_tolerance: 1.0,
                p_distance_gain: 1.0,
                p_turn_gain: 0.1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration() {
        let config = DriveConfig::default();
        assert_eq!(config.platform.ticks_per_revolution, 72);
        assert_eq!(config.platform.track_width, 17.0);
        assert_eq!(config.platform.initial_heading, FRAC_PI_2);

        // One revolution of a 7.5-unit wheel spread over 72 ticks
        let expected = PI * 7.5 / 72.0;
        assert!((config.platform.units_per_tick() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DriveConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[platform]"));
        assert!(toml_string.contains("[limits]"));
        assert!(toml_string.contains("[steering]"));
        assert!(toml_string.contains("ticks_per_revolution = 72"));

        let parsed: DriveConfig = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.limits.max_wheel_speed, config.limits.max_wheel_speed);
        assert_eq!(
            parsed.steering.heading_threshold,
            config.steering.heading_threshold
        );
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[platform]
ticks_per_revolution = 360
wheel_diameter = 6.0
track_width = 12.5
initial_heading = 0.0

[limits]
max_wheel_speed = 500

[steering]
heading = { kp = 2.0, ki = 0.0, kd = 0.1 }
distance = { kp = 0.4, ki = 0.0, kd = 0.0 }
steering_gain = 40.0
heading_threshold = 0.1
min_approach_distance = 5.0
arrival_tolerance = 0.5
p_distance_gain = 1.0
p_turn_gain = 0.2
"#;

        let config: DriveConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.platform.ticks_per_revolution, 360);
        assert_eq!(config.limits.max_wheel_speed, 500);
        assert_eq!(config.steering.heading.kp, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_geometry() {
        let mut config = DriveConfig::default();
        config.platform.track_width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter(_))
        ));

        let mut config = DriveConfig::default();
        config.platform.ticks_per_revolution = 0;
        assert!(config.validate().is_err());
    }
}
