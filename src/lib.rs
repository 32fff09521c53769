//! ChakraDrive - motion control core for a differential-drive robot
//!
//! Converts wheel-encoder pulses into a dead-reckoned 2D pose estimate,
//! exposes tick-counted open-loop motion primitives, and iterates a
//! goal-seeking steering controller, all over a serial drive board.
//!
//! ## Features
//!
//! - `mock`: Enable mock device simulation for hardware-free testing

pub mod config;
pub mod devices;
pub mod drivers;
pub mod encoder;
pub mod error;
pub mod motion;
pub mod odometry;
pub mod platform;
pub mod transport;

// Re-export commonly used types
pub use config::DriveConfig;
pub use devices::driveboard::{WheelCommand, WheelDirection};
pub use error::{Error, Result};
pub use motion::{Goal, NavProgress, TurnDirection};
pub use odometry::Pose;
pub use platform::Platform;
