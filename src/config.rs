//! Chip clock configuration

use crate::{Result, Y8950Error};

/// Default input clock (MSX-AUDIO cartridge, 3.579545 MHz)
pub const DEFAULT_CLOCK: u32 = 3_579_545;

/// Default audio sample rate (44.1 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// The chip divides its input clock by 72 to get its native sample rate
pub const CLOCK_DIVIDER: u32 = 72;

/// Clock and output rate of a device
///
/// These are the only two tunables of the emulation; everything else is
/// fixed by the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChipConfig {
    /// Input clock in Hz
    pub clock: u32,
    /// Output sample rate in Hz
    pub sample_rate: u32,
}

impl ChipConfig {
    /// Create a configuration from a clock and a sample rate
    pub fn new(clock: u32, sample_rate: u32) -> Self {
        Self { clock, sample_rate }
    }

    /// Check that the configuration can drive the table generators
    ///
    /// # Errors
    ///
    /// Returns [`Y8950Error::ConfigError`] for a zero sample rate or a clock
    /// below the chip's /72 divider.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Y8950Error::ConfigError(
                "sample rate must be non-zero".to_string(),
            ));
        }
        if self.clock < CLOCK_DIVIDER {
            return Err(Y8950Error::ConfigError(format!(
                "clock {} Hz is below the /{} divider",
                self.clock, CLOCK_DIVIDER
            )));
        }
        Ok(())
    }

    /// Native output rate of the chip at this clock (clock / 72)
    pub fn native_rate(&self) -> u32 {
        self.clock / CLOCK_DIVIDER
    }
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK, DEFAULT_SAMPLE_RATE)
    }
}
