//! FM operator
//!
//! An operator couples a phase generator, an envelope generator and the
//! log-sine lookup. Derived values (phase increment, total level, rate
//! scale, envelope increment) are cached and must be recomputed with
//! [`Operator::update_all`] after any patch or frequency change.

use super::constants::{
    DB_MUTE, DP_BASE_BITS, DP_WIDTH, EG_TO_DB_STEPS, PG_WIDTH, PM_AMP_BITS,
};
use super::envelope::{Envelope, EnvelopeState};
use super::lfo::LfoOutput;
use super::patch::Patch;
use super::tables::Tables;

/// Position of an operator inside its channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorRole {
    /// First operator; modulates the carrier or is summed with it
    Modulator,
    /// Second operator; its output reaches the mixer
    Carrier,
}

/// One of the 18 operators of the chip
#[derive(Clone, Debug)]
pub struct Operator {
    role: OperatorRole,
    patch: Patch,
    /// Phase accumulator (19-bit)
    phase: u32,
    phase_increment: u32,
    /// Waveform table index from the last evaluation
    pg_out: u32,
    envelope: Envelope,
    fnum: u32,
    block: u32,
    /// Key scale level plus total level, in envelope steps
    tll: u32,
    /// Rate scale offset
    rks: u32,
    /// Attenuation applied during the last evaluation
    attenuation: u32,
    /// Linear output history, newest first
    output: [i32; 2],
    /// Averaged output fed back into the modulator phase
    feedback: i32,
}

impl Operator {
    /// Create an operator with a cleared patch and a finished envelope
    pub fn new(role: OperatorRole) -> Self {
        Self {
            role,
            patch: Patch::default(),
            phase: 0,
            phase_increment: 0,
            pg_out: 0,
            envelope: Envelope::new(),
            fnum: 0,
            block: 0,
            tll: 0,
            rks: 0,
            attenuation: 0,
            output: [0; 2],
            feedback: 0,
        }
    }

    /// Modulator or carrier
    #[inline]
    pub fn role(&self) -> OperatorRole {
        self.role
    }

    /// Current voice parameters
    #[inline]
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Mutable voice parameters; follow up with [`Operator::update_all`]
    #[inline]
    pub(crate) fn patch_mut(&mut self) -> &mut Patch {
        &mut self.patch
    }

    /// Phase accumulator
    #[inline]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Per-sample phase increment (before pitch modulation)
    #[inline]
    pub fn phase_increment(&self) -> u32 {
        self.phase_increment
    }

    /// Attenuation applied during the last evaluation (0-511)
    #[inline]
    pub fn attenuation(&self) -> u32 {
        self.attenuation
    }

    /// Envelope generator state
    #[inline]
    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    /// Envelope phase accumulator
    #[inline]
    pub fn envelope_phase(&self) -> u32 {
        self.envelope.phase()
    }

    /// Per-sample envelope increment
    #[inline]
    pub fn envelope_increment(&self) -> u32 {
        self.envelope.increment()
    }

    /// Combined key scale and total level attenuation
    #[inline]
    pub fn total_level_attenuation(&self) -> u32 {
        self.tll
    }

    /// Rate scale offset applied to envelope rates
    #[inline]
    pub fn rate_scale(&self) -> u32 {
        self.rks
    }

    /// Latest averaged output (the value a modulator hands to its channel)
    #[inline]
    pub fn feedback(&self) -> i32 {
        self.feedback
    }

    /// Store channel pitch inputs; follow up with [`Operator::update_all`]
    ///
    /// # Arguments
    ///
    /// * `fnum` - 10-bit F-number
    /// * `block` - Octave (0-7)
    #[inline]
    pub fn set_frequency(&mut self, fnum: u32, block: u32) {
        self.fnum = fnum & 0x3FF;
        self.block = block & 7;
    }

    /// Recompute every derived value
    ///
    /// Order matters: the envelope increment depends on the rate scale.
    pub fn update_all(&mut self, tables: &Tables) {
        let fixed = tables.clock_tables();
        self.phase_increment =
            tables.phase_increment(self.fnum, self.block, self.patch.multiplier as u32);
        self.tll = fixed.total_level(
            self.fnum >> 6,
            self.block,
            self.patch.total_level as u32,
            self.patch.ksl as u32,
        );
        self.rks = fixed.rate_scale(self.fnum >> 9, self.block, self.patch.ksr);
        self.envelope
            .refresh(&self.patch, self.rks, tables.rate_tables());
    }

    /// Restart phase and envelope
    #[inline]
    pub fn key_on(&mut self) {
        self.envelope.key_on();
        self.phase = 0;
    }

    /// Move the envelope into release
    #[inline]
    pub fn key_off(&mut self, tables: &Tables) {
        self.envelope.key_off(tables.clock_tables());
    }

    /// Advance envelope then phase by one sample
    #[inline]
    fn advance(&mut self, tables: &Tables, lfo: LfoOutput) {
        let raw = self.envelope.advance(&self.patch, self.rks, tables);
        let mut attenuation = (raw + self.tll) * EG_TO_DB_STEPS;
        if self.patch.am {
            attenuation = attenuation.wrapping_add(lfo.am as u32);
        }
        self.attenuation = attenuation.min(DB_MUTE - 1);

        let step = if self.patch.pm {
            self.phase_increment.wrapping_mul(lfo.pm as u32) >> PM_AMP_BITS
        } else {
            self.phase_increment
        };
        self.phase = self.phase.wrapping_add(step) & (DP_WIDTH - 1);
        self.pg_out = self.phase >> DP_BASE_BITS;
    }

    #[inline]
    fn lookup(&self, tables: &Tables, index: i32) -> i32 {
        let fixed = tables.clock_tables();
        let wave = fixed.sine(index as usize & (PG_WIDTH - 1));
        fixed.db2lin((wave + self.attenuation) as usize)
    }

    /// Evaluate as a carrier
    ///
    /// # Arguments
    ///
    /// * `fm` - Modulator output, doubled into a phase offset
    /// * `tables` - Device tables
    /// * `lfo` - LFO values for this sample
    pub fn calc_carrier(&mut self, fm: i32, tables: &Tables, lfo: LfoOutput) -> i32 {
        self.advance(tables, lfo);
        if self.attenuation >= DB_MUTE - 1 {
            return 0;
        }
        self.lookup(tables, (self.pg_out as i32).wrapping_add(fm << 1))
    }

    /// Evaluate as a modulator and return its averaged output
    pub fn calc_modulator(&mut self, tables: &Tables, lfo: LfoOutput) -> i32 {
        self.output[1] = self.output[0];
        self.advance(tables, lfo);

        self.output[0] = if self.attenuation >= DB_MUTE - 1 {
            0
        } else if self.patch.feedback > 0 {
            let fm = self.feedback >> (7 - self.patch.feedback);
            self.lookup(tables, (self.pg_out as i32).wrapping_add(fm))
        } else {
            self.lookup(tables, self.pg_out as i32)
        };

        self.feedback = (self.output[1] + self.output[0]) >> 1;
        self.feedback
    }

    /// Clear patch and runtime state, keeping the role
    pub fn reset(&mut self) {
        *self = Self::new(self.role);
    }
}
