//! Envelope generator
//!
//! Each operator runs its own state machine over a 23-bit envelope phase.
//! The phase is log-domain attenuation (higher = quieter); its top 9 bits
//! form the envelope output, except during attack where the attack curve
//! maps the phase onto a perceptually even ramp.
//!
//! ```text
//! key-on ──► Attack ──overflow──► Decay ──SL reached──► SusHold (sustained patch)
//!                                              └──────► Sustain (percussive patch)
//! key-off ─────────────────────────────────────────────► Release
//! Sustain / Release ──output saturates──► Finish
//! ```

use super::constants::{
    EG_DP_SHIFT, EG_DP_WIDTH, EG_MAX, EG_MUTE, PERCUSSIVE_RELEASE_RATE, SUSTAIN_LEVELS,
};
use super::patch::Patch;
use super::tables::{ClockTables, RateTables, Tables};

/// Envelope generator state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EnvelopeState {
    /// Rising from silence after key-on
    Attack,
    /// Falling towards the sustain level
    Decay,
    /// Held at the sustain level while keyed (sustained patches)
    SusHold,
    /// Natural decay past the sustain level (percussive patches)
    Sustain,
    /// Falling after key-off
    Release,
    /// Silent; the operator no longer advances
    #[default]
    Finish,
}

/// Envelope generator of one operator
#[derive(Clone, Debug)]
pub struct Envelope {
    state: EnvelopeState,
    phase: u32,
    increment: u32,
}

impl Envelope {
    /// Create a silent, finished envelope
    pub fn new() -> Self {
        Self {
            state: EnvelopeState::Finish,
            phase: EG_DP_WIDTH,
            increment: 0,
        }
    }

    /// Current state
    #[inline]
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current envelope phase (23-bit fixed point)
    #[inline]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Current per-sample phase increment
    #[inline]
    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// Recompute the increment for the current state
    ///
    /// # Arguments
    ///
    /// * `patch` - Operator voice parameters
    /// * `rks` - Rate scale offset (0-15)
    /// * `rates` - Rate tables of the device
    pub fn refresh(&mut self, patch: &Patch, rks: u32, rates: &RateTables) {
        let rks = rks as usize;
        self.increment = match self.state {
            EnvelopeState::Attack => rates.attack_increment(patch.attack as usize, rks),
            EnvelopeState::Decay => rates.decay_increment(patch.decay as usize, rks),
            EnvelopeState::SusHold | EnvelopeState::Finish => 0,
            EnvelopeState::Sustain => rates.decay_increment(patch.release as usize, rks),
            EnvelopeState::Release => {
                let rate = if patch.sustained {
                    patch.release as usize
                } else {
                    PERCUSSIVE_RELEASE_RATE
                };
                rates.decay_increment(rate, rks)
            }
        };
    }

    /// Advance one sample and return the raw envelope output (0-512)
    ///
    /// The value still needs the operator's total level and the amplitude
    /// LFO added before it becomes an attenuation.
    pub fn advance(&mut self, patch: &Patch, rks: u32, tables: &Tables) -> u32 {
        match self.state {
            EnvelopeState::Attack => {
                // A large increment can carry past bit 23 into bit 24
                self.phase = self.phase.saturating_add(self.increment);
                if self.phase >= EG_DP_WIDTH {
                    self.phase = 0;
                    self.state = EnvelopeState::Decay;
                    self.refresh(patch, rks, tables.rate_tables());
                    0
                } else {
                    tables
                        .clock_tables()
                        .attack_curve((self.phase >> EG_DP_SHIFT) as usize)
                }
            }
            EnvelopeState::Decay => {
                self.phase = self.phase.wrapping_add(self.increment);
                let threshold = SUSTAIN_LEVELS[patch.sustain_level as usize & 15];
                if self.phase >= threshold {
                    self.phase = threshold;
                    self.state = if patch.sustained {
                        EnvelopeState::SusHold
                    } else {
                        EnvelopeState::Sustain
                    };
                    self.refresh(patch, rks, tables.rate_tables());
                }
                self.phase >> EG_DP_SHIFT
            }
            EnvelopeState::SusHold => {
                if !patch.sustained {
                    self.state = EnvelopeState::Sustain;
                    self.refresh(patch, rks, tables.rate_tables());
                }
                self.phase >> EG_DP_SHIFT
            }
            EnvelopeState::Sustain | EnvelopeState::Release => {
                self.phase = self.phase.wrapping_add(self.increment);
                let out = self.phase >> EG_DP_SHIFT;
                if out >= EG_MUTE {
                    self.state = EnvelopeState::Finish;
                    EG_MAX
                } else {
                    out
                }
            }
            EnvelopeState::Finish => EG_MAX,
        }
    }

    /// Restart from full volume attack
    ///
    /// The increment is stale until the next [`Envelope::refresh`].
    #[inline]
    pub fn key_on(&mut self) {
        self.state = EnvelopeState::Attack;
        self.phase = 0;
    }

    /// Enter release from the current loudness
    ///
    /// An attack in progress is folded through the attack curve so the
    /// release starts at the attenuation that was last emitted.
    #[inline]
    pub fn key_off(&mut self, fixed: &ClockTables) {
        if self.state == EnvelopeState::Attack {
            let emitted = fixed.attack_curve((self.phase >> EG_DP_SHIFT) as usize);
            self.phase = emitted << EG_DP_SHIFT;
        }
        self.state = EnvelopeState::Release;
    }

    /// Return to the silent, finished state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
