// SmartDrive dual-channel DC motor controller driver
//
// Provides:
// - Fixed register map and control bitfields for the two channels
// - Motion commands (run unlimited, run for seconds, stop, reset)
// - Status reads and the blocking timed-run completion wait

pub mod bus;
pub mod config;
mod driver;
pub mod registers;
pub mod types;

pub use bus::{ALTERNATE_ADDRESS, DEFAULT_ADDRESS, I2cBus, LinuxI2cBus, Result, SmartDriveError};
pub use driver::SmartDrive;
pub use types::{
    Channel, Direction, Motor, SPEED_FULL, SPEED_MEDIUM, SPEED_SLOW, StopAction, WaitMode,
};
