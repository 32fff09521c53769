//! Drive board wire protocol
//!
//! One command frame per bus transaction, 6 bytes:
//!
//! `[leftSpeedHi, leftSpeedLo, leftDir, rightSpeedHi, rightSpeedLo, rightDir]`
//!
//! Speeds are unsigned 16-bit big-endian magnitudes; the direction byte is
//! 0 = forward, 1 = reverse. The board sends no acknowledgement for a
//! command; its status is polled separately as a single byte.

use crate::error::{Error, Result};

/// Command frame length in bytes
pub const FRAME_LEN: usize = 6;

/// Wheel rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Forward,
    Reverse,
}

impl WheelDirection {
    /// Wire encoding: 0 = forward, 1 = reverse
    pub fn as_byte(self) -> u8 {
        match self {
            WheelDirection::Forward => 0,
            WheelDirection::Reverse => 1,
        }
    }

    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(WheelDirection::Forward),
            1 => Ok(WheelDirection::Reverse),
            other => Err(Error::InvalidFrame(format!(
                "direction byte must be 0 or 1, got {:#04x}",
                other
            ))),
        }
    }

    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            WheelDirection::Forward => WheelDirection::Reverse,
            WheelDirection::Reverse => WheelDirection::Forward,
        }
    }
}

/// Per-wheel speed and direction command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelCommand {
    pub left_speed: u16,
    pub left_dir: WheelDirection,
    pub right_speed: u16,
    pub right_dir: WheelDirection,
}

impl WheelCommand {
    pub fn new(
        left_speed: u16,
        left_dir: WheelDirection,
        right_speed: u16,
        right_dir: WheelDirection,
    ) -> Self {
        Self {
            left_speed,
            left_dir,
            right_speed,
            right_dir,
        }
    }

    /// All-stop command: zero speed, both wheels forward
    pub fn stop() -> Self {
        Self::new(0, WheelDirection::Forward, 0, WheelDirection::Forward)
    }

    /// Encode into one wire frame
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let left = self.left_speed.to_be_bytes();
        let right = self.right_speed.to_be_bytes();
        [
            left[0],
            left[1],
            self.left_dir.as_byte(),
            right[0],
            right[1],
            self.right_dir.as_byte(),
        ]
    }

    /// Decode one wire frame
    pub fn decode(frame: &[u8]) -> Result<Self> {
        if frame.len() != FRAME_LEN {
            return Err(Error::InvalidFrame(format!(
                "expected {} bytes, got {}",
                FRAME_LEN,
                frame.len()
            )));
        }

        Ok(Self {
            left_speed: u16::from_be_bytes([frame[0], frame[1]]),
            left_dir: WheelDirection::from_byte(frame[2])?,
            right_speed: u16::from_be_bytes([frame[3], frame[4]]),
            right_dir: WheelDirection::from_byte(frame[5])?,
        })
    }

    /// Clamp both speeds to the board's maximum
    pub(crate) fn clamped(mut self, max_speed: u16) -> Self {
        self.left_speed = self.left_speed.min(max_speed);
        self.right_speed = self.right_speed.min(max_speed);
        self
    }

    /// True if both wheels are commanded to zero speed
    pub fn is_stop(&self) -> bool {
        self.left_speed == 0 && self.right_speed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_encoding() {
        let cmd = WheelCommand::new(
            300,
            WheelDirection::Forward,
            300,
            WheelDirection::Reverse,
        );
        assert_eq!(cmd.encode(), [0x01, 0x2C, 0x00, 0x01, 0x2C, 0x01]);
    }

    #[test]
    fn test_stop_encoding() {
        assert_eq!(WheelCommand::stop().encode(), [0x00; FRAME_LEN]);
        assert!(WheelCommand::stop().is_stop());
    }

    #[test]
    fn test_decode_round_trip() {
        let cmd = WheelCommand::new(
            1023,
            WheelDirection::Reverse,
            7,
            WheelDirection::Forward,
        );
        let decoded = WheelCommand::decode(&cmd.encode()).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn test_decode_rejects_bad_frames() {
        assert!(WheelCommand::decode(&[0x00; 5]).is_err());
        assert!(WheelCommand::decode(&[0, 0, 2, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_clamping() {
        let cmd = WheelCommand::new(
            2000,
            WheelDirection::Forward,
            400,
            WheelDirection::Forward,
        )
        .clamped(1000);
        assert_eq!(cmd.left_speed, 1000);
        assert_eq!(cmd.right_speed, 400);
    }
}
