//! Open-drain pin pair over `embassy_rp::gpio::Flex`

use embassy_rp::gpio::{AnyPin, Flex, Level, Pull};
use embassy_rp::Peri;
use embassy_time::{block_for, Duration};
use softwire_hal::I2cPins;

/// How long both lines must read high before the bus counts as free.
const BUSY_SETTLE_US: u64 = 10;

/// An SDA/SCL pair emulating open-drain on RP2040 GPIO.
///
/// Works with any two GPIO pins; external pull-up resistors are still
/// required for the internal ~50 kΩ pulls to matter little at bus speed,
/// but the internal pulls are enabled as a fallback.
pub struct FlexPins<'d> {
    sda: Flex<'d>,
    scl: Flex<'d>,
}

impl<'d> FlexPins<'d> {
    pub fn new(sda: Peri<'d, AnyPin>, scl: Peri<'d, AnyPin>) -> Self {
        let mut sda = Flex::new(sda);
        let mut scl = Flex::new(scl);
        for pin in [&mut sda, &mut scl] {
            pin.set_pull(Pull::Up);
            // Park the output latch low; direction switches then make
            // the line go low without a separate level write.
            pin.set_level(Level::Low);
            pin.set_as_input();
        }
        Self { sda, scl }
    }

    fn drive_low(pin: &mut Flex<'_>) {
        pin.set_as_output();
    }

    fn release_line(pin: &mut Flex<'_>) {
        pin.set_as_input();
    }
}

impl I2cPins for FlexPins<'_> {
    fn configure(&mut self) {
        Self::release_line(&mut self.sda);
        Self::release_line(&mut self.scl);
    }

    fn release(&mut self) {
        Self::release_line(&mut self.sda);
        Self::release_line(&mut self.scl);
    }

    fn set_sda_high(&mut self) {
        Self::release_line(&mut self.sda);
    }

    fn set_sda_low(&mut self) {
        Self::drive_low(&mut self.sda);
    }

    fn set_scl_high(&mut self) {
        Self::release_line(&mut self.scl);
    }

    fn set_scl_low(&mut self) {
        Self::drive_low(&mut self.scl);
    }

    fn sda_as_input(&mut self) {
        Self::release_line(&mut self.sda);
    }

    // With emulated open-drain the pin only becomes an output when
    // driven low, so the direction switch alone does nothing here.
    fn sda_as_output(&mut self) {}

    fn scl_as_input(&mut self) {
        Self::release_line(&mut self.scl);
    }

    fn scl_as_output(&mut self) {}

    fn read_sda(&mut self) -> bool {
        self.sda.is_high()
    }

    fn read_scl(&mut self) -> bool {
        self.scl.is_high()
    }

    fn is_bus_busy(&mut self) -> bool {
        Self::release_line(&mut self.sda);
        Self::release_line(&mut self.scl);
        block_for(Duration::from_micros(BUSY_SETTLE_US));
        !(self.sda.is_high() && self.scl.is_high())
    }
}
