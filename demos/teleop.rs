// Keyboard teleop: WASD drive, SPACE stop, R/F speed, Q quit

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use smartdrive::{DEFAULT_ADDRESS, Direction, I2cBus, Motor, SmartDrive, StopAction};
use tracing::info;

const SPEEDS: [u8; 3] = [25, 60, 90];

// Coast the motors after this much time with no key pressed.
const INPUT_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// I2C bus the controller is connected to
    #[arg(short, long, default_value = smartdrive::config::DEFAULT_BUS)]
    device: PathBuf,

    /// I2C address of the controller
    #[arg(short, long, default_value_t = DEFAULT_ADDRESS)]
    address: u16,
}

fn main() -> smartdrive::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut drive = SmartDrive::open_at(&args.device, args.address)?;

    info!("Controls: WASD=drive, SPACE=stop, R/F=speed, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(&mut drive);
    disable_raw_mode()?;

    drive.stop(Motor::Both, StopAction::Float);
    result
}

fn run_teleop<B: I2cBus>(drive: &mut SmartDrive<B>) -> smartdrive::Result<()> {
    let mut speed_idx: usize = 0;
    let mut moving = false;
    let mut last_input = Instant::now();

    loop {
        // Poll for a key at 50Hz
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;
                if !pressed {
                    continue;
                }

                let speed = SPEEDS[speed_idx];
                match code {
                    KeyCode::Char('w') => {
                        drive.run_unlimited(Motor::Both, Direction::Forward, speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Char('s') => {
                        drive.run_unlimited(Motor::Both, Direction::Reverse, speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    // Tank turns: channels in opposite directions
                    KeyCode::Char('a') => {
                        drive.run_unlimited(Motor::M1, Direction::Reverse, speed);
                        drive.run_unlimited(Motor::M2, Direction::Forward, speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Char('d') => {
                        drive.run_unlimited(Motor::M1, Direction::Forward, speed);
                        drive.run_unlimited(Motor::M2, Direction::Reverse, speed);
                        moving = true;
                        last_input = Instant::now();
                    }
                    KeyCode::Char(' ') => {
                        drive.stop(Motor::Both, StopAction::Brake);
                        moving = false;
                    }
                    KeyCode::Char('r') => {
                        speed_idx = (speed_idx + 1).min(SPEEDS.len() - 1);
                        info!("Speed: {}", SPEEDS[speed_idx]);
                    }
                    KeyCode::Char('f') => {
                        speed_idx = speed_idx.saturating_sub(1);
                        info!("Speed: {}", SPEEDS[speed_idx]);
                    }
                    KeyCode::Char('q') => break,
                    _ => {}
                }
            }
        }

        // Deadman: coast if the operator lets go of the keys.
        if moving && last_input.elapsed() > INPUT_TIMEOUT {
            drive.stop(Motor::Both, StopAction::Float);
            moving = false;
        }
    }

    Ok(())
}
