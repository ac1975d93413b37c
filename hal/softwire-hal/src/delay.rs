//! Time source for bit timing
//!
//! The engine never counts cycles itself; it asks an injected delay
//! capability to wait, so the timing logic can run against a simulated
//! clock in host tests.

/// Microsecond-granularity delay.
///
/// Implementations may busy-wait or yield to a scheduler depending on
/// the duration, but must not allow other work to toggle the same bus
/// lines while waiting.
pub trait DelayUs {
    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);
}
