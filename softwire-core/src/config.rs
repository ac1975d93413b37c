//! Bus timing configuration

/// Software I2C bus configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftI2cConfig {
    /// Target clock frequency in Hz
    pub frequency: u32,
}

impl Default for SoftI2cConfig {
    fn default() -> Self {
        Self {
            frequency: 300_000,
        }
    }
}

impl SoftI2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Half-period delay between line transitions, in microseconds.
    ///
    /// Two of these make one full SCL period. Clamped at both ends:
    /// frequencies at or above 1 MHz still yield a nonzero delay (the
    /// real bus rate then tops out wherever the pin toggling does),
    /// and a zero frequency is floored to 1 Hz instead of dividing by
    /// zero.
    pub const fn half_period_us(&self) -> u32 {
        let hz = if self.frequency == 0 {
            1
        } else {
            self.frequency
        };
        let us = 1_000_000 / hz;
        if us == 0 {
            1
        } else {
            us
        }
    }
}
