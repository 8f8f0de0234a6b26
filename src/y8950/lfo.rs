//! Shared modulation sources
//!
//! - Pitch and amplitude LFOs (one of each per chip, two depth presets)
//! - Noise generator (16-bit shift register, reserved for rhythm voices)

use super::constants::{
    AM_DP_BITS, AM_DP_WIDTH, AM_PG_BITS, PM_DP_BITS, PM_DP_WIDTH, PM_PG_BITS,
};
use super::tables::Tables;

/// LFO values for one sample
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LfoOutput {
    /// Attenuation added to AM-enabled operators, in envelope steps
    pub am: i32,
    /// Pitch factor applied to PM-enabled operators (256 = unity)
    pub pm: i32,
}

/// Pitch and amplitude LFO pair
///
/// Both phases advance once per sample; the depth presets come from
/// register 0xBD.
#[derive(Clone, Debug, Default)]
pub struct Lfo {
    pm_phase: u32,
    am_phase: u32,
    pm_deep: bool,
    am_deep: bool,
    output: LfoOutput,
}

impl Lfo {
    /// Create an LFO pair at phase zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the depth presets
    ///
    /// # Arguments
    ///
    /// * `am_deep` - 4.8 dB instead of 1 dB amplitude swing
    /// * `pm_deep` - 13.75 instead of 6.875 cents pitch swing
    #[inline]
    pub fn set_depths(&mut self, am_deep: bool, pm_deep: bool) {
        self.am_deep = am_deep;
        self.pm_deep = pm_deep;
    }

    /// Amplitude depth preset
    #[inline]
    pub fn am_deep(&self) -> bool {
        self.am_deep
    }

    /// Pitch depth preset
    #[inline]
    pub fn pm_deep(&self) -> bool {
        self.pm_deep
    }

    /// Advance both phases and sample the depth tables
    #[inline]
    pub fn tick(&mut self, tables: &Tables) -> LfoOutput {
        let rates = tables.rate_tables();
        let fixed = tables.clock_tables();

        self.pm_phase = (self.pm_phase + rates.pm_increment()) & (PM_DP_WIDTH - 1);
        self.am_phase = (self.am_phase + rates.am_increment()) & (AM_DP_WIDTH - 1);

        self.output = LfoOutput {
            am: fixed.am(self.am_deep, (self.am_phase >> (AM_DP_BITS - AM_PG_BITS)) as usize),
            pm: fixed.pm(self.pm_deep, (self.pm_phase >> (PM_DP_BITS - PM_PG_BITS)) as usize),
        };
        self.output
    }

    /// Values produced by the most recent tick
    #[inline]
    pub fn output(&self) -> LfoOutput {
        self.output
    }

    /// Return phases, depths and outputs to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Noise generator seed after reset
pub const NOISE_SEED: u32 = 0xFFFF;

/// Noise generator using a 16-bit shift register
///
/// Advanced every sample so its sequence stays aligned with the chip even
/// though only the rhythm voices would consume it.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    seed: u32,
}

impl NoiseGenerator {
    /// Create a noise generator at its reset seed
    pub fn new() -> Self {
        Self { seed: NOISE_SEED }
    }

    /// Advance one step and return the new register value
    #[inline]
    pub fn tick(&mut self) -> u32 {
        self.seed = ((self.seed >> 15) ^ ((self.seed >> 12) & 1)) | ((self.seed << 1) & 0xFFFF);
        self.seed
    }

    /// Current register value
    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Reload the reset seed
    pub fn reset(&mut self) {
        self.seed = NOISE_SEED;
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
