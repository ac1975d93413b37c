//! Busy-wait delay backed by the embassy time driver

use embassy_time::{block_for, Duration};
use softwire_hal::DelayUs;

/// Blocking microsecond delay.
///
/// Bit-bang timing has to hold the line state across the wait, so this
/// spins instead of yielding to the executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingDelay;

impl DelayUs for BlockingDelay {
    fn delay_us(&mut self, us: u32) {
        block_for(Duration::from_micros(us as u64));
    }
}
