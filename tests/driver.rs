// Protocol-level tests driving the SmartDrive against a recording mock
// bus: write ordering, dispatch codes, control bitfields, completion
// polling, and the two error policies.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use smartdrive::{
    Channel, Direction, I2cBus, Motor, Result, SmartDrive, SmartDriveError, StopAction, WaitMode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum BusOp {
    WriteReg(u8, u8),
    WriteRaw(Vec<u8>),
}

#[derive(Default)]
struct Inner {
    ops: Vec<BusOp>,
    reads: HashMap<u8, VecDeque<u8>>,
    read_log: Vec<u8>,
    fail_writes: bool,
    fail_reads: bool,
}

/// Mock bus: records writes, serves scripted register reads. Registers
/// with no scripted value read as zero.
#[derive(Clone, Default)]
struct MockBus {
    inner: Arc<Mutex<Inner>>,
}

impl MockBus {
    fn new() -> Self {
        Self::default()
    }

    fn push_read(&self, register: u8, value: u8) {
        let mut inner = self.inner.lock().unwrap();
        inner.reads.entry(register).or_default().push_back(value);
    }

    fn ops(&self) -> Vec<BusOp> {
        self.inner.lock().unwrap().ops.clone()
    }

    fn reads_of(&self, register: u8) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.read_log.iter().filter(|&&r| r == register).count()
    }

    fn fail_writes(&self) {
        self.inner.lock().unwrap().fail_writes = true;
    }

    fn fail_reads(&self) {
        self.inner.lock().unwrap().fail_reads = true;
    }
}

fn bus_down() -> SmartDriveError {
    SmartDriveError::Io(io::Error::other("mock bus down"))
}

impl I2cBus for MockBus {
    fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(bus_down());
        }
        inner.read_log.push(register);
        let value = inner
            .reads
            .get_mut(&register)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(0);
        Ok(value)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(bus_down());
        }
        inner.ops.push(BusOp::WriteReg(register, value));
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(bus_down());
        }
        inner.ops.push(BusOp::WriteRaw(bytes.to_vec()));
        Ok(())
    }
}

#[test]
fn run_unlimited_buffers_both_channels_then_dispatches_once() {
    let mock = MockBus::new();
    let mut drive = SmartDrive::with_bus(mock.clone());

    drive.run_unlimited(Motor::Both, Direction::Forward, 50);

    // SPEED | BRAKE | GO
    let ctrl = 0x91;
    assert_eq!(
        mock.ops(),
        vec![
            BusOp::WriteRaw(vec![0x46, 50, 0, 0, ctrl]),
            BusOp::WriteRaw(vec![0x4E, 50, 0, 0, ctrl]),
            BusOp::WriteReg(0x41, b'S'),
        ]
    );
}

#[test]
fn run_unlimited_reverse_negates_speed() {
    let mock = MockBus::new();
    let mut drive = SmartDrive::with_bus(mock.clone());

    drive.run_unlimited(Motor::M2, Direction::Reverse, 50);

    assert_eq!(
        mock.ops(),
        vec![
            BusOp::WriteRaw(vec![0x4E, (-50i8) as u8, 0, 0, 0x91]),
            BusOp::WriteReg(0x41, b'S'),
        ]
    );
}

#[test]
fn stop_is_a_single_dispatch_byte() {
    let cases = [
        (Motor::M1, StopAction::Brake, 0x41),
        (Motor::M2, StopAction::Float, 0x62),
        (Motor::Both, StopAction::BrakeHold, 0x43),
    ];
    for (motor, action, code) in cases {
        let mock = MockBus::new();
        let mut drive = SmartDrive::with_bus(mock.clone());
        drive.stop(motor, action);
        assert_eq!(mock.ops(), vec![BusOp::WriteReg(0x41, code)]);
    }
}

#[test]
fn reset_encoders_dispatches_reset_code() {
    let mock = MockBus::new();
    let mut drive = SmartDrive::with_bus(mock.clone());
    drive.reset_encoders();
    assert_eq!(mock.ops(), vec![BusOp::WriteReg(0x41, b'R')]);
}

#[test]
fn run_seconds_sets_time_on_and_conditional_brake() {
    // Braking stop action: SPEED | TIME | ON | GO | BRAKE
    let mock = MockBus::new();
    let mut drive = SmartDrive::with_bus(mock.clone());
    drive
        .run_seconds(Motor::M1, Direction::Forward, 30, 5, WaitMode::DontWait, StopAction::Brake)
        .unwrap();
    assert_eq!(
        mock.ops(),
        vec![
            BusOp::WriteRaw(vec![0x46, 30, 5, 0, 0xF1]),
            BusOp::WriteReg(0x41, b'S'),
        ]
    );

    // Float: no BRAKE bit, everything else unchanged.
    let mock = MockBus::new();
    let mut drive = SmartDrive::with_bus(mock.clone());
    drive
        .run_seconds(Motor::M1, Direction::Forward, 30, 5, WaitMode::DontWait, StopAction::Float)
        .unwrap();
    assert_eq!(
        mock.ops(),
        vec![
            BusOp::WriteRaw(vec![0x46, 30, 5, 0, 0xE1]),
            BusOp::WriteReg(0x41, b'S'),
        ]
    );
}

#[test]
fn is_time_done_for_both_is_a_conjunction() {
    // (m1 pending, m2 pending) -> done?
    let cases = [
        (0x00, 0x00, true),
        (0x40, 0x00, false),
        (0x00, 0x40, false),
        (0x40, 0x40, false),
    ];
    for (m1, m2, done) in cases {
        let mock = MockBus::new();
        mock.push_read(0x5A, m1);
        mock.push_read(0x5B, m2);
        let mut drive = SmartDrive::with_bus(mock.clone());
        assert_eq!(drive.is_time_done(Motor::Both).unwrap(), done);
    }
}

#[test]
fn is_time_done_single_channel_checks_bit_0x40() {
    let mock = MockBus::new();
    mock.push_read(0x5B, 0x42);
    let mut drive = SmartDrive::with_bus(mock.clone());
    assert!(!drive.is_time_done(Motor::M2).unwrap());

    mock.push_read(0x5B, 0x02);
    assert!(drive.is_time_done(Motor::M2).unwrap());
}

#[test]
fn waiter_polls_until_done() {
    let mock = MockBus::new();
    // Pending three times, then the empty queue reads as 0 (done).
    for _ in 0..3 {
        mock.push_read(0x5A, 0x40);
    }
    let mut drive = SmartDrive::with_bus(mock.clone());
    drive.wait_until_time_done(Motor::M1).unwrap();
    assert_eq!(mock.reads_of(0x5A), 4);
}

#[test]
fn run_seconds_waits_after_dispatch() {
    let mock = MockBus::new();
    mock.push_read(0x5A, 0x40);
    let mut drive = SmartDrive::with_bus(mock.clone());

    drive
        .run_seconds(
            Motor::M1,
            Direction::Forward,
            20,
            1,
            WaitMode::WaitForCompletion,
            StopAction::Float,
        )
        .unwrap();

    // Block and dispatch were written before any status poll, and the
    // waiter kept polling past the first pending report.
    assert_eq!(
        mock.ops(),
        vec![
            BusOp::WriteRaw(vec![0x46, 20, 1, 0, 0xE1]),
            BusOp::WriteReg(0x41, b'S'),
        ]
    );
    assert_eq!(mock.reads_of(0x5A), 2);
}

#[test]
fn motion_commands_swallow_write_failures() {
    let mock = MockBus::new();
    mock.fail_writes();
    let mut drive = SmartDrive::with_bus(mock.clone());

    // None of these may panic or error; no dispatch ever lands.
    drive.run_unlimited(Motor::Both, Direction::Forward, 50);
    drive.stop(Motor::Both, StopAction::Brake);
    drive.reset_encoders();
    assert_eq!(mock.ops(), vec![]);
}

#[test]
fn run_seconds_skips_wait_when_command_fails() {
    let mock = MockBus::new();
    mock.fail_writes();
    mock.fail_reads();
    let mut drive = SmartDrive::with_bus(mock.clone());

    // With reads also failing, touching the status register would
    // error; Ok proves the wait was skipped.
    let result = drive.run_seconds(
        Motor::Both,
        Direction::Forward,
        50,
        2,
        WaitMode::WaitForCompletion,
        StopAction::Brake,
    );
    assert!(result.is_ok());
}

#[test]
fn status_reads_propagate_failures() {
    let mock = MockBus::new();
    mock.fail_reads();
    let mut drive = SmartDrive::with_bus(mock.clone());

    assert!(drive.status(Channel::M1).is_err());
    assert!(drive.is_time_done(Motor::Both).is_err());
    assert!(drive.wait_until_time_done(Motor::M1).is_err());
    assert!(drive.motor_current(Channel::M2).is_err());
    assert!(drive.encoder_position(Channel::M1).is_err());
}

#[test]
fn current_and_position_assemble_little_endian() {
    let mock = MockBus::new();
    mock.push_read(0x70, 0x34);
    mock.push_read(0x71, 0x12);
    mock.push_read(0x52, 0x78);
    mock.push_read(0x53, 0x56);
    mock.push_read(0x54, 0x34);
    mock.push_read(0x55, 0x12);

    let mut drive = SmartDrive::with_bus(mock.clone());
    assert_eq!(drive.motor_current(Channel::M1).unwrap(), 0x1234);
    assert_eq!(drive.encoder_position(Channel::M1).unwrap(), 0x1234_5678);
}

#[test]
fn drop_floats_both_motors() {
    let mock = MockBus::new();
    {
        let _drive = SmartDrive::with_bus(mock.clone());
    }
    assert_eq!(mock.ops(), vec![BusOp::WriteReg(0x41, b'c')]);
}
