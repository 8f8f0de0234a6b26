//! Per-operator voice parameters
//!
//! A patch is the decoded form of an operator's four register bytes plus
//! the channel feedback amount. It only changes through register writes.

/// Voice parameters of one operator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Patch {
    /// Amplitude LFO enable
    pub am: bool,
    /// Pitch LFO enable
    pub pm: bool,
    /// Envelope type: hold at sustain level while keyed
    pub sustained: bool,
    /// Key scale rate: scale envelope speed with pitch
    pub ksr: bool,
    /// Frequency multiplier index (0-15)
    pub multiplier: u8,
    /// Attack rate (0-15)
    pub attack: u8,
    /// Decay rate (0-15)
    pub decay: u8,
    /// Sustain level index (0-15)
    pub sustain_level: u8,
    /// Release rate (0-15)
    pub release: u8,
    /// Key scale level selector (0-3)
    pub ksl: u8,
    /// Total level (0-63, 0.75 dB steps)
    pub total_level: u8,
    /// Self-feedback amount (0-7, modulator only)
    pub feedback: u8,
}

impl Patch {
    /// Decode register 0x20+: AM(7) PM(6) EG(5) KSR(4) MUL(3:0)
    #[inline]
    pub fn set_mode(&mut self, value: u8) {
        self.am = value & 0x80 != 0;
        self.pm = value & 0x40 != 0;
        self.sustained = value & 0x20 != 0;
        self.ksr = value & 0x10 != 0;
        self.multiplier = value & 0x0F;
    }

    /// Decode register 0x40+: KSL(7:6) TL(5:0)
    #[inline]
    pub fn set_level(&mut self, value: u8) {
        self.ksl = value >> 6;
        self.total_level = value & 0x3F;
    }

    /// Decode register 0x60+: AR(7:4) DR(3:0)
    #[inline]
    pub fn set_attack_decay(&mut self, value: u8) {
        self.attack = value >> 4;
        self.decay = value & 0x0F;
    }

    /// Decode register 0x80+: SL(7:4) RR(3:0)
    #[inline]
    pub fn set_sustain_release(&mut self, value: u8) {
        self.sustain_level = value >> 4;
        self.release = value & 0x0F;
    }

    /// Decode the feedback field of register 0xC0+: FB(3:1)
    #[inline]
    pub fn set_feedback(&mut self, value: u8) {
        self.feedback = (value >> 1) & 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_byte() {
        let mut patch = Patch::default();
        patch.set_mode(0xA7);
        assert!(patch.am);
        assert!(!patch.pm);
        assert!(patch.sustained);
        assert!(!patch.ksr);
        assert_eq!(patch.multiplier, 7);

        patch.set_mode(0x50);
        assert!(!patch.am && patch.pm && !patch.sustained && patch.ksr);
        assert_eq!(patch.multiplier, 0);
    }

    #[test]
    fn test_envelope_bytes() {
        let mut patch = Patch::default();
        patch.set_level(0xC5);
        patch.set_attack_decay(0xF2);
        patch.set_sustain_release(0x4E);
        assert_eq!((patch.ksl, patch.total_level), (3, 5));
        assert_eq!((patch.attack, patch.decay), (15, 2));
        assert_eq!((patch.sustain_level, patch.release), (4, 14));
    }

    #[test]
    fn test_feedback_ignores_algorithm_bit() {
        let mut patch = Patch::default();
        patch.set_feedback(0x0F);
        assert_eq!(patch.feedback, 7);
        patch.set_feedback(0x01);
        assert_eq!(patch.feedback, 0);
    }
}
