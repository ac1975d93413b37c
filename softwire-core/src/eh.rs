//! `embedded-hal` adapter
//!
//! Implements the blocking [`embedded_hal::i2c::I2c`] trait on top of
//! the engine primitives so existing ecosystem device drivers can run
//! over a Softwire bus unchanged.
//!
//! The adapter follows the embedded-hal contract rather than the native
//! engine semantics: on the first missing acknowledge it issues a stop
//! condition and returns immediately instead of completing the
//! remaining phases.

use embedded_hal::i2c::{
    self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress,
};
use softwire_hal::{DelayUs, I2cPins};

use crate::engine::{Direction, SoftI2c, SoftI2cError};

impl i2c::Error for SoftI2cError {
    fn kind(&self) -> ErrorKind {
        match self {
            SoftI2cError::NoAcknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            SoftI2cError::InvalidParams => ErrorKind::Other,
        }
    }
}

impl<P: I2cPins, D: DelayUs> ErrorType for SoftI2c<P, D> {
    type Error = SoftI2cError;
}

impl<P: I2cPins, D: DelayUs> SoftI2c<P, D> {
    /// Start (repeated start when mid-transaction) plus address byte;
    /// stops and bails on a missing acknowledge.
    fn address_phase(&mut self, address: u8, direction: Direction) -> Result<(), SoftI2cError> {
        self.start();
        self.send_address(address, direction);
        if !self.check_ack() {
            self.stop();
            return Err(SoftI2cError::NoAcknowledge);
        }
        Ok(())
    }
}

impl<P: I2cPins, D: DelayUs> I2c<SevenBitAddress> for SoftI2c<P, D> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }

        self.bus_idle();
        let mut prev: Option<Direction> = None;
        for i in 0..operations.len() {
            // Adjacent operations of the same direction continue the
            // current frame without a repeated start; a read chunk only
            // NACKs its final byte if no further read follows.
            let next_is_read = matches!(operations.get(i + 1), Some(Operation::Read(_)));
            match &mut operations[i] {
                Operation::Read(buf) => {
                    if prev != Some(Direction::Read) {
                        self.address_phase(address, Direction::Read)?;
                        prev = Some(Direction::Read);
                    }
                    let count = buf.len();
                    for (idx, byte) in buf.iter_mut().enumerate() {
                        *byte = self.read_byte();
                        if idx + 1 < count || next_is_read {
                            self.send_ack();
                        } else {
                            self.send_nack();
                        }
                    }
                }
                Operation::Write(bytes) => {
                    if prev != Some(Direction::Write) {
                        self.address_phase(address, Direction::Write)?;
                        prev = Some(Direction::Write);
                    }
                    for &byte in bytes.iter() {
                        self.write_byte(byte);
                        if !self.check_ack() {
                            self.stop();
                            return Err(SoftI2cError::NoAcknowledge);
                        }
                    }
                }
            }
        }
        self.stop();
        Ok(())
    }
}
