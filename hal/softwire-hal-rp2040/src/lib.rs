//! RP2040 implementations of the Softwire capability traits
//!
//! The RP2040 GPIO block has no open-drain output mode, so [`FlexPins`]
//! emulates one: a line is driven low by switching the pin to output
//! (the output latch is parked low), and released high by switching it
//! back to a pulled-up input. The pin never drives high, which keeps a
//! misbehaving or clock-stretching slave from shorting against the
//! master.

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod pins;

pub use delay::BlockingDelay;
pub use pins::FlexPins;
