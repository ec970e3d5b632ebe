// Driver timing constants
use std::time::Duration;

// Delay between dispatching a timed run and the first status poll; the
// device needs this long before the status register reflects the new
// action.
pub const STATUS_SETTLE_DELAY: Duration = Duration::from_secs(1);

// Pause between completion polls so the wait loop does not saturate
// the bus.
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

// Default Linux I2C bus device node.
pub const DEFAULT_BUS: &str = "/dev/i2c-1";
