// High-level SmartDrive driver
//
// Translates motion intents into register writes. Motion commands
// buffer a speed/time block per selected channel, then latch every
// buffered channel with a single dispatch byte so both motors start in
// the same bus transaction window. Stops are dispatch-only.

use std::path::Path;
use std::thread;

use tracing::{info, warn};

use crate::bus::{DEFAULT_ADDRESS, I2cBus, LinuxI2cBus, Result};
use crate::config::{POLL_INTERVAL, STATUS_SETTLE_DELAY};
use crate::registers::{REG_COMMAND, STATUS_TIME_PENDING, cmd, control};
use crate::types::{Channel, Direction, Motor, StopAction, WaitMode};

/// Driver for the SmartDrive dual-channel DC motor controller.
///
/// Owns the bus exclusively; every operation runs on the caller's
/// thread. Motion commands are best-effort (write failures are logged
/// and swallowed), status reads surface their failures.
pub struct SmartDrive<B: I2cBus> {
    bus: B,
}

impl SmartDrive<LinuxI2cBus> {
    /// Open the controller at the default address on the given bus.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_at(path, DEFAULT_ADDRESS)
    }

    /// Open the controller at a specific address.
    pub fn open_at(path: impl AsRef<Path>, address: u16) -> Result<Self> {
        info!(
            "Opening SmartDrive on {} at 0x{:02X}",
            path.as_ref().display(),
            address
        );
        Ok(Self::with_bus(LinuxI2cBus::open(path, address)?))
    }
}

impl<B: I2cBus> SmartDrive<B> {
    /// Build a driver over an already-open bus.
    pub fn with_bus(bus: B) -> Self {
        Self { bus }
    }

    /// Run the selected motor(s) until stopped.
    ///
    /// `speed` is a magnitude, 0..=100 by convention; values outside
    /// that range are passed through and leave device behavior
    /// undefined.
    pub fn run_unlimited(&mut self, motor: Motor, direction: Direction, speed: u8) {
        let ctrl = control::SPEED | control::BRAKE | control::GO;
        let signed = direction.signed_speed(speed);
        if let Err(e) = self.buffer_and_dispatch(motor, signed, 0, ctrl) {
            warn!("Motor command failed: {}", e);
        }
    }

    /// Run the selected motor(s) for `seconds` (the device takes a
    /// single byte, so 255 s is the longest run), then apply
    /// `stop_action`.
    ///
    /// With [`WaitMode::WaitForCompletion`] the call blocks until the
    /// device reports the timed action finished; failures of the
    /// status reads backing that wait are returned. The command writes
    /// themselves are best-effort like every other motion command, and
    /// a failed command skips the wait.
    pub fn run_seconds(
        &mut self,
        motor: Motor,
        direction: Direction,
        speed: u8,
        seconds: u8,
        wait: WaitMode,
        stop_action: StopAction,
    ) -> Result<()> {
        let mut ctrl = control::SPEED | control::TIME | control::ON | control::GO;
        if stop_action.is_braking() {
            ctrl |= control::BRAKE;
        }
        let signed = direction.signed_speed(speed);
        if let Err(e) = self.buffer_and_dispatch(motor, signed, seconds, ctrl) {
            warn!("Motor command failed: {}", e);
            return Ok(());
        }
        if wait == WaitMode::WaitForCompletion {
            // The status register lags the dispatch; reading it too
            // early reports the previous action as already done.
            thread::sleep(STATUS_SETTLE_DELAY);
            self.wait_until_time_done(motor)?;
        }
        Ok(())
    }

    /// Stop the selected motor(s) immediately. Dispatch-only; no
    /// channel buffers are written.
    pub fn stop(&mut self, motor: Motor, stop_action: StopAction) {
        if let Err(e) = self.bus.write_register(REG_COMMAND, stop_code(motor, stop_action)) {
            warn!("Motor command failed: {}", e);
        }
    }

    /// Reset both encoder positions to zero.
    pub fn reset_encoders(&mut self) {
        if let Err(e) = self.bus.write_register(REG_COMMAND, cmd::RESET_ENCODERS) {
            warn!("Motor command failed: {}", e);
        }
    }

    /// Raw status register byte for one channel.
    pub fn status(&mut self, channel: Channel) -> Result<u8> {
        self.bus.read_register(channel.status_reg())
    }

    /// True once every selected channel has finished its timed action.
    pub fn is_time_done(&mut self, motor: Motor) -> Result<bool> {
        for &channel in motor.channels() {
            if self.status(channel)? & STATUS_TIME_PENDING != 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Motor current draw in raw device units.
    pub fn motor_current(&mut self, channel: Channel) -> Result<u16> {
        let base = channel.current_reg();
        let lo = self.bus.read_register(base)?;
        let hi = self.bus.read_register(base + 1)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Encoder position in raw device units.
    pub fn encoder_position(&mut self, channel: Channel) -> Result<i32> {
        let base = channel.position_reg();
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.bus.read_register(base + i as u8)?;
        }
        Ok(i32::from_le_bytes(bytes))
    }

    /// Block until the selected channel(s) report the timed action
    /// done.
    ///
    /// There is no timeout: if the device never reports completion
    /// (e.g. it was unplugged mid-run) this waits forever. Callers
    /// needing a bound must impose one externally, for instance by
    /// running the wait on a thread they can abandon.
    pub fn wait_until_time_done(&mut self, motor: Motor) -> Result<()> {
        while !self.is_time_done(motor)? {
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }

    // Buffer the speed/time block for each selected channel, then latch
    // them with one dispatch write. The dispatch must come last: the
    // buffered values have no effect until it lands.
    fn buffer_and_dispatch(&mut self, motor: Motor, speed: i8, seconds: u8, ctrl: u8) -> Result<()> {
        for &channel in motor.channels() {
            self.bus.write_raw(&speed_block(channel, speed, seconds, ctrl))?;
        }
        self.bus.write_register(REG_COMMAND, cmd::START)
    }
}

impl<B: I2cBus> Drop for SmartDrive<B> {
    fn drop(&mut self) {
        // Leave the motors coasting rather than running headless.
        self.stop(Motor::Both, StopAction::Float);
    }
}

/// Per-channel write block: start register, signed speed, run time in
/// seconds (0 for an unlimited run), padding, control byte.
fn speed_block(channel: Channel, speed: i8, seconds: u8, ctrl: u8) -> [u8; 5] {
    [channel.speed_reg(), speed as u8, seconds, 0, ctrl]
}

/// Dispatch code for an immediate stop.
fn stop_code(motor: Motor, stop_action: StopAction) -> u8 {
    match (stop_action.is_braking(), motor) {
        (true, Motor::M1) => cmd::BRAKE_M1,
        (true, Motor::M2) => cmd::BRAKE_M2,
        (true, Motor::Both) => cmd::BRAKE_BOTH,
        (false, Motor::M1) => cmd::FLOAT_M1,
        (false, Motor::M2) => cmd::FLOAT_M2,
        (false, Motor::Both) => cmd::FLOAT_BOTH,
    }
}
