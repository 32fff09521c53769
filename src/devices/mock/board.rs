//! Simulated drive board
//!
//! Closes the hardware loop without hardware: decodes the latest command
//! frame written to a shared [`MockTransport`], and on every simulation
//! step converts the commanded wheel speeds into encoder ticks on the
//! platform's [`TickCounters`]. Encoders count pulse magnitude only, so
//! ticks accumulate regardless of the commanded direction, exactly as the
//! real counters do.

use super::noise::NoiseGenerator;
use crate::devices::driveboard::{WheelCommand, FRAME_LEN};
use crate::encoder::{TickCounters, Wheel};
use crate::transport::MockTransport;
use std::sync::Arc;

/// Simulated motor driver board
pub struct MockBoard {
    transport: MockTransport,
    counters: Arc<TickCounters>,
    /// Encoder ticks produced per speed unit per step
    ticks_per_speed: f32,
    /// Multiplicative wheel slip noise (standard deviation, 0 = none)
    slip_stddev: f32,
    noise: NoiseGenerator,
    /// Accumulated fractional ticks per wheel
    left_accumulator: f32,
    right_accumulator: f32,
}

impl MockBoard {
    /// Create a simulated board observing `transport` and driving `counters`
    pub fn new(transport: MockTransport, counters: Arc<TickCounters>) -> Self {
        Self {
            transport,
            counters,
            ticks_per_speed: 0.01,
            slip_stddev: 0.0,
            noise: NoiseGenerator::new(42),
            left_accumulator: 0.0,
            right_accumulator: 0.0,
        }
    }

    /// Set how many ticks one speed unit produces per step
    pub fn with_ticks_per_speed(mut self, ticks_per_speed: f32) -> Self {
        self.ticks_per_speed = ticks_per_speed;
        self
    }

    /// Enable multiplicative slip noise with a fixed seed
    pub fn with_slip_noise(mut self, stddev: f32, seed: u64) -> Self {
        self.slip_stddev = stddev;
        self.noise = NoiseGenerator::new(seed);
        self
    }

    /// Latest command the platform has written, if any
    ///
    /// Frames are fixed-size, so the newest command is the frame at the
    /// tail of the write stream.
    pub fn latest_command(&self) -> Option<WheelCommand> {
        let written = self.transport.written();
        if written.len() < FRAME_LEN {
            return None;
        }
        WheelCommand::decode(&written[written.len() - FRAME_LEN..]).ok()
    }

    /// Advance the simulation by one step
    ///
    /// Converts the currently commanded speeds into encoder edges.
    pub fn step(&mut self) {
        let command = match self.latest_command() {
            Some(command) => command,
            None => return,
        };

        let left_slip = 1.0 + self.noise.gaussian(self.slip_stddev);
        let right_slip = 1.0 + self.noise.gaussian(self.slip_stddev);

        self.left_accumulator +=
            (command.left_speed as f32 * self.ticks_per_speed * left_slip).max(0.0);
        self.right_accumulator +=
            (command.right_speed as f32 * self.ticks_per_speed * right_slip).max(0.0);

        let left_whole = self.left_accumulator.trunc() as u32;
        let right_whole = self.right_accumulator.trunc() as u32;
        self.left_accumulator = self.left_accumulator.fract();
        self.right_accumulator = self.right_accumulator.fract();

        for _ in 0..left_whole {
            self.counters.increment(Wheel::Left);
        }
        for _ in 0..right_whole {
            self.counters.increment(Wheel::Right);
        }
    }

    /// Queue a status byte for the platform's next status read
    pub fn inject_status(&self, byte: u8) {
        self.transport.inject_read(&[byte]);
    }
}
