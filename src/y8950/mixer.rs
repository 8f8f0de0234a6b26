//! Y8950 Output Mixer
//!
//! Every output stream (9 FM channels, 5 reserved rhythm voices, the PCM
//! channel) owns a 16-bit latch. Each sample the stream's contribution is
//! added to its latch and the latch is halved, a one-pole smoothing of the
//! chip's output stage. The final sample is the saturated sum of all
//! latches.

use bitflags::bitflags;

/// Number of output latches
pub const OUTPUT_SLOTS: usize = 15;

/// Latch index of the PCM channel
pub const PCM_SLOT: usize = 14;

bitflags! {
    /// Mute mask (1 = muted)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u32 {
        /// Channel 0
        const CH0 = 1 << 0;
        /// Channel 1
        const CH1 = 1 << 1;
        /// Channel 2
        const CH2 = 1 << 2;
        /// Channel 3
        const CH3 = 1 << 3;
        /// Channel 4
        const CH4 = 1 << 4;
        /// Channel 5
        const CH5 = 1 << 5;
        /// Channel 6
        const CH6 = 1 << 6;
        /// Channel 7
        const CH7 = 1 << 7;
        /// Channel 8
        const CH8 = 1 << 8;
        /// All nine FM channels
        const ALL_FM = 0x1FF;
        /// Hi-hat rhythm voice
        const HH = 1 << 9;
        /// Cymbal rhythm voice
        const CYM = 1 << 10;
        /// Tom-tom rhythm voice
        const TOM = 1 << 11;
        /// Snare drum rhythm voice
        const SD = 1 << 12;
        /// Bass drum rhythm voice
        const BD = 1 << 13;
        /// All rhythm voices
        const RHYTHM = Self::HH.bits()
            | Self::CYM.bits()
            | Self::TOM.bits()
            | Self::SD.bits()
            | Self::BD.bits();
        /// PCM channel
        const PCM = 1 << 14;
    }
}

impl ChannelMask {
    /// Mask bit of one output latch (0-8 FM, 9-13 rhythm, 14 PCM)
    #[inline]
    pub const fn channel(index: usize) -> Self {
        Self::from_bits_retain(1 << index)
    }

    /// Check whether an output latch is muted
    #[inline]
    pub fn is_muted(&self, index: usize) -> bool {
        self.contains(Self::channel(index))
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        Self::empty()
    }
}

/// Output latches and mute mask
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    outputs: [i16; OUTPUT_SLOTS],
    mask: ChannelMask,
}

impl Mixer {
    /// Create a mixer with cleared latches and nothing muted
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one stream's contribution and decay its latch
    ///
    /// # Arguments
    ///
    /// * `slot` - Latch index (0-14)
    /// * `contribution` - This sample's output of the stream, 0 when silent
    #[inline]
    pub fn latch(&mut self, slot: usize, contribution: i32) {
        let sum = (self.outputs[slot] as i32).wrapping_add(contribution) as i16;
        self.outputs[slot] = sum >> 1;
    }

    /// Saturated sum of all latches
    #[inline]
    pub fn mix(&self) -> i16 {
        let sum: i32 = self.outputs.iter().map(|&o| o as i32).sum();
        sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    /// Current value of one latch
    #[inline]
    pub fn output(&self, slot: usize) -> i16 {
        self.outputs[slot]
    }

    /// Current mute mask
    #[inline]
    pub fn mask(&self) -> ChannelMask {
        self.mask
    }

    /// Check whether a stream is muted
    #[inline]
    pub fn is_muted(&self, slot: usize) -> bool {
        self.mask.is_muted(slot)
    }

    /// Replace the mute mask, returning the previous one
    pub fn set_mask(&mut self, mask: ChannelMask) -> ChannelMask {
        std::mem::replace(&mut self.mask, mask)
    }

    /// Flip mute bits, returning the previous mask
    pub fn toggle_mask(&mut self, mask: ChannelMask) -> ChannelMask {
        let previous = self.mask;
        self.mask ^= mask;
        previous
    }

    /// Clear all latches; the mute mask survives
    pub fn reset(&mut self) {
        self.outputs = [0; OUTPUT_SLOTS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_bits() {
        assert_eq!(ChannelMask::channel(0), ChannelMask::CH0);
        assert_eq!(ChannelMask::channel(8), ChannelMask::CH8);
        assert_eq!(ChannelMask::channel(14), ChannelMask::PCM);
        assert_eq!(ChannelMask::RHYTHM.bits(), 0x3E00);
        assert_eq!(ChannelMask::ALL_FM.bits(), 0x1FF);
        assert!(ChannelMask::ALL_FM.is_muted(4));
        assert!(!ChannelMask::ALL_FM.is_muted(PCM_SLOT));
    }

    #[test]
    fn test_set_mask_round_trip() {
        let mut mixer = Mixer::new();
        let m1 = ChannelMask::CH2 | ChannelMask::PCM;
        mixer.set_mask(m1);
        let previous = mixer.set_mask(ChannelMask::ALL_FM);
        assert_eq!(previous, m1);
        mixer.set_mask(previous);
        assert_eq!(mixer.mask(), m1);
    }

    #[test]
    fn test_toggle_mask_twice_is_noop() {
        let mut mixer = Mixer::new();
        mixer.set_mask(ChannelMask::CH1);
        let toggle = ChannelMask::CH1 | ChannelMask::CH5;
        assert_eq!(mixer.toggle_mask(toggle), ChannelMask::CH1);
        assert_eq!(mixer.mask(), ChannelMask::CH5);
        mixer.toggle_mask(toggle);
        assert_eq!(mixer.mask(), ChannelMask::CH1);
    }

    #[test]
    fn test_latch_decays() {
        let mut mixer = Mixer::new();
        mixer.latch(0, 1000);
        assert_eq!(mixer.output(0), 500);
        mixer.latch(0, 0);
        assert_eq!(mixer.output(0), 250);
        mixer.latch(0, -1000);
        assert_eq!(mixer.output(0), -375);
        for _ in 0..16 {
            mixer.latch(0, 0);
        }
        // Arithmetic shift settles negative values at -1
        assert_eq!(mixer.output(0), -1);
    }

    #[test]
    fn test_mix_saturates() {
        let mut mixer = Mixer::new();
        for slot in 0..OUTPUT_SLOTS {
            mixer.latch(slot, 30_000);
        }
        assert_eq!(mixer.mix(), i16::MAX);

        mixer.reset();
        for slot in 0..OUTPUT_SLOTS {
            mixer.latch(slot, -30_000);
        }
        assert_eq!(mixer.mix(), i16::MIN);
    }

    #[test]
    fn test_reset_keeps_mask() {
        let mut mixer = Mixer::new();
        mixer.set_mask(ChannelMask::PCM);
        mixer.latch(3, 100);
        mixer.reset();
        assert_eq!(mixer.output(3), 0);
        assert_eq!(mixer.mask(), ChannelMask::PCM);
    }
}
