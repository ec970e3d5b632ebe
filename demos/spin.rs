// Run both motors forward for a few seconds, then back again.

use std::path::PathBuf;

use clap::Parser;
use smartdrive::{DEFAULT_ADDRESS, Direction, Motor, SPEED_MEDIUM, SmartDrive, StopAction, WaitMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// I2C bus the controller is connected to
    #[arg(short, long, default_value = smartdrive::config::DEFAULT_BUS)]
    device: PathBuf,

    /// I2C address of the controller
    #[arg(short, long, default_value_t = DEFAULT_ADDRESS)]
    address: u16,

    /// Run time per leg, in seconds (device limit: 255)
    #[arg(short, long, default_value_t = 3)]
    seconds: u8,
}

fn main() -> smartdrive::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();
    let mut drive = SmartDrive::open_at(&args.device, args.address)?;

    info!("Forward for {}s", args.seconds);
    drive.run_seconds(
        Motor::Both,
        Direction::Forward,
        SPEED_MEDIUM,
        args.seconds,
        WaitMode::WaitForCompletion,
        StopAction::Brake,
    )?;

    info!("Reverse for {}s", args.seconds);
    drive.run_seconds(
        Motor::Both,
        Direction::Reverse,
        SPEED_MEDIUM,
        args.seconds,
        WaitMode::WaitForCompletion,
        StopAction::Float,
    )?;

    info!("Done");
    Ok(())
}
