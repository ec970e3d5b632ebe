// SmartDrive register map
//
// Single source of truth for the controller's fixed register layout.
// Every address and command code below is dictated by the device
// firmware and must be preserved bit-exact.

use crate::types::Channel;

/// Shared command dispatch register. Writing a command code here makes
/// the controller act on previously buffered per-channel values, or
/// execute an immediate stop.
pub const REG_COMMAND: u8 = 0x41;

/// Channel 1 speed register, base of its speed/time write block.
pub const REG_SPEED_M1: u8 = 0x46;
/// Channel 1 run-time register (speed block + 1).
pub const REG_TIME_M1: u8 = 0x47;
/// Channel 2 speed register, base of its speed/time write block.
pub const REG_SPEED_M2: u8 = 0x4E;
/// Channel 2 run-time register (speed block + 1).
pub const REG_TIME_M2: u8 = 0x4F;

/// Channel 1 encoder position, 4 bytes little-endian.
pub const REG_POSITION_M1: u8 = 0x52;
/// Channel 2 encoder position, 4 bytes little-endian.
pub const REG_POSITION_M2: u8 = 0x56;

/// Channel 1 status register.
pub const REG_STATUS_M1: u8 = 0x5A;
/// Channel 2 status register.
pub const REG_STATUS_M2: u8 = 0x5B;

/// Channel 1 motor current, 2 bytes little-endian.
pub const REG_CURRENT_M1: u8 = 0x70;
/// Channel 2 motor current, 2 bytes little-endian.
pub const REG_CURRENT_M2: u8 = 0x72;

/// Status register bit: timed action still pending. Clear means done.
pub const STATUS_TIME_PENDING: u8 = 0x40;

/// Control byte flags. A control byte is assembled fresh for every
/// command; no bits carry over between commands.
pub mod control {
    /// The buffered speed byte is valid.
    pub const SPEED: u8 = 0x01;
    /// Apply brakes when the action ends.
    pub const BRAKE: u8 = 0x10;
    /// Keep the motor powered for the duration of a timed run.
    pub const ON: u8 = 0x20;
    /// The buffered run-time byte is valid.
    pub const TIME: u8 = 0x40;
    /// Start motion.
    pub const GO: u8 = 0x80;
}

/// Dispatch command codes (ASCII, per the device firmware).
pub mod cmd {
    /// Latch buffered values and start every selected channel in the
    /// same bus transaction window.
    pub const START: u8 = b'S';
    /// Reset both encoder positions to zero.
    pub const RESET_ENCODERS: u8 = b'R';
    /// Stop channel 1 and brake.
    pub const BRAKE_M1: u8 = b'A';
    /// Stop channel 2 and brake.
    pub const BRAKE_M2: u8 = b'B';
    /// Stop both channels and brake.
    pub const BRAKE_BOTH: u8 = b'C';
    /// Stop channel 1 and coast.
    pub const FLOAT_M1: u8 = b'a';
    /// Stop channel 2 and coast.
    pub const FLOAT_M2: u8 = b'b';
    /// Stop both channels and coast.
    pub const FLOAT_BOTH: u8 = b'c';
}

impl Channel {
    /// Base of this channel's speed/time write block.
    pub fn speed_reg(self) -> u8 {
        match self {
            Channel::M1 => REG_SPEED_M1,
            Channel::M2 => REG_SPEED_M2,
        }
    }

    /// This channel's status register.
    pub fn status_reg(self) -> u8 {
        match self {
            Channel::M1 => REG_STATUS_M1,
            Channel::M2 => REG_STATUS_M2,
        }
    }

    /// First byte of this channel's motor current pair.
    pub fn current_reg(self) -> u8 {
        match self {
            Channel::M1 => REG_CURRENT_M1,
            Channel::M2 => REG_CURRENT_M2,
        }
    }

    /// First byte of this channel's encoder position word.
    pub fn position_reg(self) -> u8 {
        match self {
            Channel::M1 => REG_POSITION_M1,
            Channel::M2 => REG_POSITION_M2,
        }
    }
}
