//! Softwire hardware abstraction layer
//!
//! This crate defines the capability traits the Softwire transaction
//! engine is generic over. Chip-specific ports (RP2040, STM32, ...)
//! implement them; the engine never touches hardware registers itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device drivers (EEPROM, sensors, ...)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softwire-core (transaction engine)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softwire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ softwire-hal- │       │  other ports  │
//! │    rp2040     │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pins::I2cPins`] - SDA/SCL line control for one bus
//! - [`delay::DelayUs`] - microsecond-granularity busy delay

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod pins;

// Re-export key traits at crate root for convenience
pub use delay::DelayUs;
pub use pins::I2cPins;
