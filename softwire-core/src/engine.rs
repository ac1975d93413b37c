//! I2C bus transaction engine
//!
//! Implements the I2C electrical protocol with nothing but pin toggling
//! and timed delays: start/stop conditions, MSB-first byte shifting,
//! acknowledge handling, and the device/register address framing on top.
//!
//! The sequencing deliberately never aborts mid-transaction. A device
//! that fails to acknowledge is recorded, the remaining phases still run
//! and a stop condition is always issued, so the bus is back in the
//! released idle state before the failure is reported. Cutting the
//! sequence short would leave SDA or SCL held and wedge every other
//! device on the bus.

use softwire_hal::{DelayUs, I2cPins};

use crate::config::SoftI2cConfig;

/// Read bit ORed into the shifted device address
const DIR_READ: u8 = 0x01;

/// How many times the data line is polled for an acknowledge after the
/// clock is raised. The first observed low wins; exhausting the budget
/// means not-acknowledged. There is no delay between samples.
const ACK_POLL_ATTEMPTS: u32 = 10;

/// Transfer direction encoded into the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Write,
    Read,
}

/// Register address framing for addressed transfers.
///
/// A `Word` address is transmitted as two independent byte transfers,
/// high byte first, each with its own acknowledge check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAddress {
    /// 8-bit register address
    Byte(u8),
    /// 16-bit register address, sent big-endian
    Word(u16),
}

impl From<u8> for RegisterAddress {
    fn from(addr: u8) -> Self {
        Self::Byte(addr)
    }
}

impl From<u16> for RegisterAddress {
    fn from(addr: u16) -> Self {
        Self::Word(addr)
    }
}

/// Errors reported by bus transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoftI2cError {
    /// Rejected before touching the bus (empty buffer)
    InvalidParams,
    /// At least one acknowledge check failed during the transaction
    NoAcknowledge,
}

/// Software I2C bus handle.
///
/// One instance per physical bus. Owns the pin pair and the delay
/// source; distinct handles on distinct pin pairs are fully independent
/// and may run transactions concurrently. For sharing a single handle
/// between tasks see [`crate::SharedSoftI2c`].
pub struct SoftI2c<P, D> {
    pins: P,
    delay: D,
    half_period_us: u32,
}

impl<P: I2cPins, D: DelayUs> SoftI2c<P, D> {
    /// Create a bus handle over a pin pair and delay source.
    ///
    /// The pins are not touched until [`init`](Self::init) is called.
    pub fn new(pins: P, delay: D, config: SoftI2cConfig) -> Self {
        Self {
            pins,
            delay,
            half_period_us: config.half_period_us(),
        }
    }

    /// Check the bus for a stuck state and configure the pins.
    ///
    /// A busy bus (both lines sampled low) is logged and otherwise
    /// ignored: the sample can read a false positive while the pull-ups
    /// are still charging the lines, so initialization proceeds
    /// regardless.
    pub fn init(&mut self) {
        if self.pins.is_bus_busy() {
            #[cfg(feature = "defmt")]
            defmt::warn!("SDA/SCL sampled low before init, bus looks stuck");
        }
        self.pins.configure();
    }

    /// Release the pin configuration.
    pub fn deinit(&mut self) {
        self.pins.release();
    }

    /// Tear the handle down and hand back its pins and delay source.
    pub fn free(self) -> (P, D) {
        let Self {
            mut pins, delay, ..
        } = self;
        pins.release();
        (pins, delay)
    }

    /// Read `buf.len()` bytes starting at register `reg`.
    ///
    /// Sequence: start, device address + write, register address
    /// byte(s), repeated start, device address + read, then the receive
    /// loop with a master acknowledge after every byte except the last,
    /// which gets a not-acknowledge, and a stop.
    ///
    /// Fails with [`SoftI2cError::InvalidParams`] before any pin
    /// operation if `buf` is empty.
    pub fn read(
        &mut self,
        address: u8,
        reg: impl Into<RegisterAddress>,
        buf: &mut [u8],
    ) -> Result<(), SoftI2cError> {
        let Some((last, head)) = buf.split_last_mut() else {
            return Err(SoftI2cError::InvalidParams);
        };

        let mut acked = true;
        self.bus_idle();
        self.start();
        self.send_address(address, Direction::Write);
        acked &= self.check_ack();
        self.wait();
        acked &= self.send_register(reg.into());
        self.wait();
        self.start();
        self.send_address(address, Direction::Read);
        acked &= self.check_ack();

        for byte in head.iter_mut() {
            *byte = self.read_byte();
            self.send_ack();
        }
        *last = self.read_byte();
        self.send_nack();
        self.stop();

        ack_result(acked)
    }

    /// Read without sending a register address first.
    ///
    /// For devices whose internal register pointer was set up by a
    /// previous operation (e.g. the DS2482 read-pointer scheme).
    pub fn read_no_reg(&mut self, address: u8, buf: &mut [u8]) -> Result<(), SoftI2cError> {
        let Some((last, head)) = buf.split_last_mut() else {
            return Err(SoftI2cError::InvalidParams);
        };

        let mut acked = true;
        self.bus_idle();
        self.start();
        self.send_address(address, Direction::Read);
        acked &= self.check_ack();

        for byte in head.iter_mut() {
            self.wait();
            *byte = self.read_byte();
            self.send_ack();
        }
        self.wait();
        *last = self.read_byte();
        self.send_nack();
        self.stop();

        ack_result(acked)
    }

    /// Write `data` starting at register `reg`.
    ///
    /// Data bytes keep flowing even after an earlier acknowledge
    /// failure; the device address, register and every data byte are
    /// individually ack-checked and the failures folded into one
    /// aggregate result once the stop condition is out.
    ///
    /// Fails with [`SoftI2cError::InvalidParams`] before any pin
    /// operation if `data` is empty.
    pub fn write(
        &mut self,
        address: u8,
        reg: impl Into<RegisterAddress>,
        data: &[u8],
    ) -> Result<(), SoftI2cError> {
        if data.is_empty() {
            return Err(SoftI2cError::InvalidParams);
        }

        let mut acked = true;
        self.bus_idle();
        self.start();
        self.send_address(address, Direction::Write);
        acked &= self.check_ack();
        self.wait();
        acked &= self.send_register(reg.into());
        self.wait();

        for &byte in data {
            self.write_byte(byte);
            acked &= self.check_ack();
            self.wait();
        }
        self.stop();

        ack_result(acked)
    }

    /// Check whether a device answers at `address`.
    ///
    /// One start, the device address with write direction, one
    /// acknowledge check, one stop - issued regardless of the outcome.
    pub fn probe(&mut self, address: u8) -> bool {
        self.start();
        self.send_address(address, Direction::Write);
        let acked = self.check_ack();
        self.stop();
        acked
    }

    // --- protocol primitives ---

    fn wait(&mut self) {
        self.delay.delay_us(self.half_period_us);
    }

    fn wait_double(&mut self) {
        self.delay.delay_us(self.half_period_us << 1);
    }

    /// Release both lines to the pulled-up idle state.
    pub(crate) fn bus_idle(&mut self) {
        critical_section::with(|_| {
            self.pins.set_sda_high();
            self.pins.set_scl_high();
        });
    }

    /// START: SDA falls while SCL is high.
    ///
    /// Also serves as the repeated start inside read transactions. The
    /// final delay is doubled to guarantee setup time for the first
    /// data bit.
    pub(crate) fn start(&mut self) {
        critical_section::with(|_| {
            self.pins.set_sda_high();
            self.pins.set_scl_high();
        });
        self.wait();
        self.pins.set_sda_low();
        self.wait();
        self.pins.set_scl_low();
        self.wait_double();
    }

    /// STOP: SDA rises while SCL is high.
    pub(crate) fn stop(&mut self) {
        critical_section::with(|_| {
            self.pins.set_sda_low();
            self.pins.set_scl_high();
        });
        self.wait();
        self.pins.set_sda_high();
        self.wait();
    }

    /// One SCL pulse clocking whatever is on SDA.
    fn clock_pulse(&mut self) {
        self.pins.set_scl_high();
        self.wait();
        self.pins.set_scl_low();
    }

    /// Shift one byte out, most significant bit first.
    pub(crate) fn write_byte(&mut self, byte: u8) {
        self.pins.set_scl_low();
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                self.pins.set_sda_high();
            } else {
                self.pins.set_sda_low();
            }
            self.wait();
            self.clock_pulse();
        }
    }

    /// Device address plus direction bit, framed like any other byte.
    pub(crate) fn send_address(&mut self, address: u8, direction: Direction) {
        let mut byte = address << 1;
        if direction == Direction::Read {
            byte |= DIR_READ;
        }
        self.write_byte(byte);
    }

    /// Register address byte(s), each individually ack-checked.
    ///
    /// Returns false if any of the address bytes went unacknowledged.
    fn send_register(&mut self, reg: RegisterAddress) -> bool {
        match reg {
            RegisterAddress::Byte(addr) => {
                self.write_byte(addr);
                self.check_ack()
            }
            RegisterAddress::Word(addr) => {
                self.write_byte((addr >> 8) as u8);
                let high_acked = self.check_ack();
                self.wait();
                self.write_byte(addr as u8);
                self.check_ack() && high_acked
            }
        }
    }

    /// Sample the acknowledge bit after a transmitted byte.
    ///
    /// SDA is released to input and SCL raised, then the line is polled
    /// up to [`ACK_POLL_ATTEMPTS`] times back to back; a device holding
    /// it low within the budget counts as an acknowledge. SCL is pulled
    /// low and SDA returned to output before the result is reported.
    pub(crate) fn check_ack(&mut self) -> bool {
        critical_section::with(|_| {
            self.pins.sda_as_input();
            self.pins.set_scl_high();
        });
        self.wait();

        let mut acked = false;
        for _ in 0..ACK_POLL_ATTEMPTS {
            if !self.pins.read_sda() {
                acked = true;
                break;
            }
        }

        critical_section::with(|_| {
            self.pins.set_scl_low();
            self.pins.sda_as_output();
        });
        self.wait();
        acked
    }

    /// Shift one byte in, most significant bit first.
    ///
    /// SDA is sampled right after each rising clock edge; the line goes
    /// back to output mode once the last bit is in.
    pub(crate) fn read_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        self.pins.sda_as_input();
        for _ in 0..8 {
            self.pins.set_scl_high();
            byte <<= 1;
            if self.pins.read_sda() {
                byte |= 0x01;
            }
            self.wait();
            self.pins.set_scl_low();
            self.wait();
        }
        self.pins.sda_as_output();
        byte
    }

    /// Master acknowledge after a received byte.
    ///
    /// An extended pulse: SDA is driven low again halfway through the
    /// high clock phase, which is redundant on a clean bus but keeps the
    /// line from drifting up on capacitive wiring.
    pub(crate) fn send_ack(&mut self) {
        critical_section::with(|_| {
            self.pins.sda_as_output();
            self.pins.set_sda_low();
        });
        self.wait();
        self.pins.set_scl_high();
        self.wait_double();
        self.pins.set_sda_low();
        self.wait_double();
        critical_section::with(|_| {
            self.pins.set_scl_low();
            self.pins.sda_as_output();
        });
        self.wait();
    }

    /// Master not-acknowledge after the final received byte.
    ///
    /// SDA is floated for one clock pulse; the pull-up presents the
    /// high level the device reads as NACK.
    pub(crate) fn send_nack(&mut self) {
        self.pins.sda_as_input();
        self.clock_pulse();
        self.pins.sda_as_output();
        self.wait();
    }
}

fn ack_result(acked: bool) -> Result<(), SoftI2cError> {
    if acked {
        Ok(())
    } else {
        Err(SoftI2cError::NoAcknowledge)
    }
}
