//! Board-agnostic bit-banged I2C master
//!
//! This crate contains the whole bus transaction engine: start/stop
//! conditions, bit-serial byte transfer, acknowledge handling and the
//! register-addressed transactions composed from them. It is generic
//! over the capability traits in `softwire-hal` and carries no
//! hardware-specific code:
//!
//! - [`SoftI2c`] - one handle per physical bus, owning its pins and
//!   delay source
//! - [`SharedSoftI2c`] - mutex-guarded wrapper for sharing one bus
//!   between tasks
//! - an [`embedded_hal::i2c::I2c`] implementation so ecosystem device
//!   drivers can sit on top of the engine
//!
//! Unit tests run on the host against a simulated slave device wired to
//! simulated open-drain lines.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod shared;

mod eh;
#[cfg(test)]
mod sim;

pub use config::SoftI2cConfig;
pub use engine::{RegisterAddress, SoftI2c, SoftI2cError};
pub use shared::SharedSoftI2c;
