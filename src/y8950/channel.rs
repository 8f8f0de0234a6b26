//! Two-operator voice channel

use super::envelope::EnvelopeState;
use super::lfo::LfoOutput;
use super::operator::{Operator, OperatorRole};
use super::tables::Tables;

/// How the two operators of a channel combine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Modulator output drives the carrier phase
    #[default]
    FrequencyModulation,
    /// Modulator and carrier outputs are summed
    Additive,
}

impl Algorithm {
    /// Decode the connection bit of register 0xC0+
    #[inline]
    pub fn from_register(value: u8) -> Self {
        if value & 1 != 0 {
            Algorithm::Additive
        } else {
            Algorithm::FrequencyModulation
        }
    }
}

/// A melodic voice: modulator, carrier, topology and key status
#[derive(Clone, Debug)]
pub struct Channel {
    modulator: Operator,
    carrier: Operator,
    algorithm: Algorithm,
    keyed: bool,
    fnum: u32,
    block: u32,
}

impl Channel {
    /// Create a silent channel
    pub fn new() -> Self {
        Self {
            modulator: Operator::new(OperatorRole::Modulator),
            carrier: Operator::new(OperatorRole::Carrier),
            algorithm: Algorithm::default(),
            keyed: false,
            fnum: 0,
            block: 0,
        }
    }

    /// First operator
    #[inline]
    pub fn modulator(&self) -> &Operator {
        &self.modulator
    }

    /// Second operator
    #[inline]
    pub fn carrier(&self) -> &Operator {
        &self.carrier
    }

    /// Operator selected by role
    #[inline]
    pub fn operator(&self, role: OperatorRole) -> &Operator {
        match role {
            OperatorRole::Modulator => &self.modulator,
            OperatorRole::Carrier => &self.carrier,
        }
    }

    #[inline]
    pub(crate) fn operator_mut(&mut self, role: OperatorRole) -> &mut Operator {
        match role {
            OperatorRole::Modulator => &mut self.modulator,
            OperatorRole::Carrier => &mut self.carrier,
        }
    }

    /// Operator topology
    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Change the operator topology
    #[inline]
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    /// True between key-on and key-off
    #[inline]
    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// 10-bit F-number
    #[inline]
    pub fn fnumber(&self) -> u32 {
        self.fnum
    }

    /// Octave (0-7)
    #[inline]
    pub fn block(&self) -> u32 {
        self.block
    }

    /// Set F-number and block on both operators
    ///
    /// Derived values are stale until [`Channel::update_all`].
    pub fn set_frequency(&mut self, fnum: u32, block: u32) {
        self.fnum = fnum & 0x3FF;
        self.block = block & 7;
        self.modulator.set_frequency(self.fnum, self.block);
        self.carrier.set_frequency(self.fnum, self.block);
    }

    /// Recompute derived values of both operators
    pub fn update_all(&mut self, tables: &Tables) {
        self.modulator.update_all(tables);
        self.carrier.update_all(tables);
    }

    /// Start both operators from attack
    pub fn key_on(&mut self) {
        self.modulator.key_on();
        self.carrier.key_on();
        self.keyed = true;
    }

    /// Release both operators
    pub fn key_off(&mut self, tables: &Tables) {
        self.modulator.key_off(tables);
        self.carrier.key_off(tables);
        self.keyed = false;
    }

    /// True once the carrier envelope has fully decayed
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.carrier.envelope_state() == EnvelopeState::Finish
    }

    /// Compute one sample of the channel
    ///
    /// The modulator is always evaluated before the carrier.
    #[inline]
    pub fn calc(&mut self, tables: &Tables, lfo: LfoOutput) -> i32 {
        let fm = self.modulator.calc_modulator(tables, lfo);
        match self.algorithm {
            Algorithm::FrequencyModulation => self.carrier.calc_carrier(fm, tables, lfo),
            Algorithm::Additive => self.carrier.calc_carrier(0, tables, lfo) + fm,
        }
    }

    /// Clear both operators, the topology and the key status
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Tables {
        Tables::acquire(3_579_545, 44_100)
    }

    fn voiced_channel(tables: &Tables) -> Channel {
        let mut ch = Channel::new();
        for role in [OperatorRole::Modulator, OperatorRole::Carrier] {
            let op = ch.operator_mut(role);
            op.patch_mut().set_mode(0x21);
            op.patch_mut().set_attack_decay(0xF0);
            op.patch_mut().set_sustain_release(0x0F);
        }
        ch.set_frequency(0x241, 4);
        ch.key_on();
        ch.update_all(tables);
        ch
    }

    #[test]
    fn test_algorithm_decode() {
        assert_eq!(Algorithm::from_register(0x00), Algorithm::FrequencyModulation);
        assert_eq!(Algorithm::from_register(0x0F), Algorithm::Additive);
    }

    #[test]
    fn test_frequency_reaches_both_operators() {
        let tables = tables();
        let ch = voiced_channel(&tables);
        assert_eq!(ch.fnumber(), 0x241);
        assert_eq!(ch.block(), 4);
        assert_eq!(
            ch.modulator().phase_increment(),
            ch.carrier().phase_increment()
        );
        assert_eq!(
            ch.carrier().phase_increment(),
            tables.phase_increment(0x241, 4, 1)
        );
    }

    #[test]
    fn test_keyed_channel_sounds() {
        let tables = tables();
        let mut ch = voiced_channel(&tables);
        assert!(ch.is_keyed());
        let energy: i64 = (0..100)
            .map(|_| ch.calc(&tables, LfoOutput::default()).abs() as i64)
            .sum();
        assert!(energy > 0);
    }

    #[test]
    fn test_algorithms_differ() {
        let tables = tables();
        let mut fm = voiced_channel(&tables);
        let mut add = voiced_channel(&tables);
        add.set_algorithm(Algorithm::Additive);

        let differs = (0..100).any(|_| {
            fm.calc(&tables, LfoOutput::default()) != add.calc(&tables, LfoOutput::default())
        });
        assert!(differs);
    }

    #[test]
    fn test_key_off_reaches_finish() {
        let tables = tables();
        let mut ch = voiced_channel(&tables);
        ch.calc(&tables, LfoOutput::default());
        ch.key_off(&tables);
        ch.update_all(&tables);
        assert!(!ch.is_keyed());

        for _ in 0..100_000 {
            if ch.is_finished() {
                break;
            }
            ch.calc(&tables, LfoOutput::default());
        }
        assert!(ch.is_finished());
        assert_eq!(ch.calc(&tables, LfoOutput::default()), 0);
    }
}
