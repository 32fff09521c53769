//! Drive board bus interface
//!
//! Writes wheel commands to the motor driver board over a [`Transport`] and
//! polls its one-byte status. Command transmission is fire-and-forget: the
//! board acknowledges nothing, status is a separate blocking read.

pub mod protocol;

pub use protocol::{WheelCommand, WheelDirection, FRAME_LEN};

use crate::error::{Error, Result};
use crate::transport::Transport;
use std::time::{Duration, Instant};

/// Motor driver board reached over a serial bus
pub struct DriveBoard {
    transport: Box<dyn Transport>,
    max_wheel_speed: u16,
}

impl DriveBoard {
    pub fn new(transport: Box<dyn Transport>, max_wheel_speed: u16) -> Self {
        Self {
            transport,
            max_wheel_speed,
        }
    }

    /// Transmit a wheel command as one bus transaction
    ///
    /// Speeds are clamped to the configured maximum. The frame goes out in
    /// a single write; there is no acknowledgement to wait for.
    pub fn set_wheel_speeds(&mut self, command: WheelCommand) -> Result<()> {
        let command = command.clamped(self.max_wheel_speed);
        let frame = command.encode();

        let written = self.transport.write(&frame)?;
        if written != frame.len() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("short command write: {} of {} bytes", written, frame.len()),
            )));
        }

        log::trace!(
            "DriveBoard: TX L={} {:?}, R={} {:?}",
            command.left_speed,
            command.left_dir,
            command.right_speed,
            command.right_dir
        );
        Ok(())
    }

    /// Stop both wheels
    pub fn stop(&mut self) -> Result<()> {
        self.set_wheel_speeds(WheelCommand::stop())
    }

    /// Read the board's status byte, blocking until one arrives
    ///
    /// Busy-waits with no timeout: a board that never responds blocks
    /// forever. Use [`status_deadline`](Self::status_deadline) where a
    /// bound is required.
    pub fn status(&mut self) -> Result<u8> {
        self.status_inner(None)
    }

    /// Read the board's status byte, giving up after `deadline`
    pub fn status_deadline(&mut self, deadline: Duration) -> Result<u8> {
        self.status_inner(Some(deadline))
    }

    fn status_inner(&mut self, deadline: Option<Duration>) -> Result<u8> {
        let start = Instant::now();
        loop {
            if self.transport.available()? >= 1 {
                let mut byte = [0u8; 1];
                if self.transport.read(&mut byte)? == 1 {
                    log::trace!("DriveBoard: status {:#04x}", byte[0]);
                    return Ok(byte[0]);
                }
            }

            if let Some(limit) = deadline {
                if start.elapsed() >= limit {
                    log::warn!("DriveBoard: status poll timed out after {:?}", limit);
                    return Err(Error::Timeout);
                }
            }
            std::thread::yield_now();
        }
    }

    /// Maximum per-wheel speed this board accepts
    pub fn max_wheel_speed(&self) -> u16 {
        self.max_wheel_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::time::Duration;

    #[test]
    fn test_command_goes_out_as_one_frame() {
        let mock = MockTransport::new();
        let mut board = DriveBoard::new(Box::new(mock.clone()), 1000);

        board
            .set_wheel_speeds(WheelCommand::new(
                300,
                WheelDirection::Forward,
                300,
                WheelDirection::Reverse,
            ))
            .unwrap();

        assert_eq!(mock.written(), vec![0x01, 0x2C, 0x00, 0x01, 0x2C, 0x01]);
    }

    #[test]
    fn test_speeds_clamped_to_board_maximum() {
        let mock = MockTransport::new();
        let mut board = DriveBoard::new(Box::new(mock.clone()), 500);

        board
            .set_wheel_speeds(WheelCommand::new(
                60_000,
                WheelDirection::Forward,
                200,
                WheelDirection::Forward,
            ))
            .unwrap();

        let frame = mock.written();
        let sent = WheelCommand::decode(&frame).unwrap();
        assert_eq!(sent.left_speed, 500);
        assert_eq!(sent.right_speed, 200);
    }

    #[test]
    fn test_status_returns_injected_byte() {
        let mock = MockTransport::new();
        let mut board = DriveBoard::new(Box::new(mock.clone()), 1000);

        mock.inject_read(&[0x42]);
        assert_eq!(board.status().unwrap(), 0x42);
    }

    #[test]
    fn test_status_deadline_times_out() {
        let mock = MockTransport::new();
        let mut board = DriveBoard::new(Box::new(mock), 1000);

        let result = board.status_deadline(Duration::from_millis(20));
        assert!(matches!(result, Err(Error::Timeout)));
    }
}
