// I2C transport for the SmartDrive controller.
//
// The controller is a register-addressed I2C slave. Three primitives
// cover the whole protocol: single-byte register reads, single-byte
// register writes, and raw multi-byte writes (start register first)
// used for the per-channel speed/time blocks.

use std::path::Path;

use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use tracing::debug;

/// Default I2C address of the controller.
pub const DEFAULT_ADDRESS: u16 = 0x1B;
/// Alternate, jumper-selected I2C address.
pub const ALTERNATE_ADDRESS: u16 = 0x36;

/// Error types for SmartDrive communication
#[derive(Debug, thiserror::Error)]
pub enum SmartDriveError {
    #[error("I2C bus error: {0}")]
    I2c(#[from] LinuxI2CError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SmartDriveError>;

/// Byte-register access to the controller.
///
/// The Linux implementation below talks to the real bus; tests drive
/// the protocol against a recording mock instead.
pub trait I2cBus {
    /// Read one byte from a register.
    fn read_register(&mut self, register: u8) -> Result<u8>;

    /// Write one byte to a register.
    fn write_register(&mut self, register: u8, value: u8) -> Result<()>;

    /// Write a contiguous buffer; the first byte is the start register,
    /// the rest land in consecutive registers.
    fn write_raw(&mut self, bytes: &[u8]) -> Result<()>;
}

/// SmartDrive bus over a Linux I2C character device.
///
/// Owns the open device exclusively; the kernel handle is released when
/// the value is dropped.
pub struct LinuxI2cBus {
    dev: LinuxI2CDevice,
}

impl LinuxI2cBus {
    /// Open the device node (e.g. `/dev/i2c-1`) with the controller's
    /// slave address selected.
    pub fn open(path: impl AsRef<Path>, address: u16) -> Result<Self> {
        let dev = LinuxI2CDevice::new(path, address)?;
        Ok(Self { dev })
    }
}

impl I2cBus for LinuxI2cBus {
    fn read_register(&mut self, register: u8) -> Result<u8> {
        let value = self.dev.smbus_read_byte_data(register)?;
        debug!("Read reg 0x{:02X} -> 0x{:02X}", register, value);
        Ok(value)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        debug!("Write reg 0x{:02X} <- 0x{:02X}", register, value);
        self.dev.smbus_write_byte_data(register, value)?;
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        debug!("Raw write {:02X?}", bytes);
        self.dev.write(bytes)?;
        Ok(())
    }
}
