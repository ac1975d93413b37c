//! Sharing one bus between tasks
//!
//! A [`SoftI2c`] handle takes `&mut self`, so ownership already rules
//! out concurrent transactions from a single task. When several tasks
//! need the same physical bus, this wrapper serializes them: every
//! public operation acquires the bus lock for its whole duration and
//! releases it on every exit path, so at most one transaction is in
//! flight per bus.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use softwire_hal::{DelayUs, I2cPins};

use crate::engine::{RegisterAddress, SoftI2c, SoftI2cError};

/// Mutex-guarded bus handle.
///
/// Generic over the `embassy-sync` raw mutex kind: pick
/// `CriticalSectionRawMutex` to share across interrupt priority levels,
/// `ThreadModeRawMutex`/`NoopRawMutex` where thread mode is the only
/// contender.
pub struct SharedSoftI2c<M: RawMutex, P, D> {
    bus: Mutex<M, RefCell<SoftI2c<P, D>>>,
}

impl<M: RawMutex, P: I2cPins, D: DelayUs> SharedSoftI2c<M, P, D> {
    /// Wrap an engine handle for shared use.
    pub fn new(bus: SoftI2c<P, D>) -> Self {
        Self {
            bus: Mutex::new(RefCell::new(bus)),
        }
    }

    /// Run a closure with exclusive access to the underlying bus.
    pub fn with<R>(&self, f: impl FnOnce(&mut SoftI2c<P, D>) -> R) -> R {
        self.bus.lock(|bus| f(&mut bus.borrow_mut()))
    }

    /// See [`SoftI2c::init`].
    pub fn init(&self) {
        self.with(|bus| bus.init());
    }

    /// See [`SoftI2c::deinit`].
    pub fn deinit(&self) {
        self.with(|bus| bus.deinit());
    }

    /// See [`SoftI2c::read`].
    pub fn read(
        &self,
        address: u8,
        reg: impl Into<RegisterAddress>,
        buf: &mut [u8],
    ) -> Result<(), SoftI2cError> {
        self.with(|bus| bus.read(address, reg, buf))
    }

    /// See [`SoftI2c::read_no_reg`].
    pub fn read_no_reg(&self, address: u8, buf: &mut [u8]) -> Result<(), SoftI2cError> {
        self.with(|bus| bus.read_no_reg(address, buf))
    }

    /// See [`SoftI2c::write`].
    pub fn write(
        &self,
        address: u8,
        reg: impl Into<RegisterAddress>,
        data: &[u8],
    ) -> Result<(), SoftI2cError> {
        self.with(|bus| bus.write(address, reg, data))
    }

    /// See [`SoftI2c::probe`].
    pub fn probe(&self, address: u8) -> bool {
        self.with(|bus| bus.probe(address))
    }
}
