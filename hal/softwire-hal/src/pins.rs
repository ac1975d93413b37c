//! SDA/SCL line control
//!
//! One implementor drives the two lines of a single I2C bus. All
//! operations are infallible: this layer has no error channel, and a
//! wiring or register fault surfaces as an acknowledge failure in the
//! transaction engine instead.

/// Pin driver for one SDA/SCL pair.
///
/// The lines are open-drain: "high" means released to the pull-up
/// resistor, never actively driven. Implementations on controllers
/// without open-drain outputs can emulate it by switching the pin
/// between output-low and pulled-up input.
///
/// Every operation must complete synchronously and quickly (at most a
/// few microseconds); the engine's bit timing assumes pin operations
/// are cheap compared to the half-period delay.
pub trait I2cPins {
    /// Claim the electrical configuration of both lines.
    ///
    /// Called once by the engine's `init`. After this both lines must
    /// be in the released (high) state.
    fn configure(&mut self);

    /// Drop the electrical configuration, releasing the lines.
    fn release(&mut self);

    /// Release the data line to the pull-up.
    fn set_sda_high(&mut self);

    /// Drive the data line low.
    fn set_sda_low(&mut self);

    /// Release the clock line to the pull-up.
    fn set_scl_high(&mut self);

    /// Drive the clock line low.
    fn set_scl_low(&mut self);

    /// Switch the data line to input mode (for ack and data-bit reads).
    fn sda_as_input(&mut self);

    /// Switch the data line back to output mode.
    fn sda_as_output(&mut self);

    /// Switch the clock line to input mode.
    ///
    /// The engine drives SCL as an output throughout; this exists for
    /// ports that want to observe clock stretching.
    fn scl_as_input(&mut self);

    /// Switch the clock line back to output mode.
    fn scl_as_output(&mut self);

    /// Current logic level of the data line.
    fn read_sda(&mut self) -> bool;

    /// Current logic level of the clock line.
    fn read_scl(&mut self) -> bool;

    /// Whether the bus is currently held busy.
    ///
    /// Both lines are sampled low after being configured as pulled-up
    /// inputs and given time to settle. Only consulted at
    /// initialization, where a positive result is a warning rather than
    /// an error: slow pull-up charging can produce false positives.
    fn is_bus_busy(&mut self) -> bool;
}
