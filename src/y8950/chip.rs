//! Y8950 device
//!
//! Ties the register decoder, the 9 channels, the shared LFOs and the output
//! latches together. One call to [`Y8950::tick`] produces one sample at the
//! configured output rate; register writes between two ticks all take effect
//! on the next one.

use log::{debug, trace};

use super::channel::{Algorithm, Channel};
use super::constants::NUM_CHANNELS;
use super::lfo::{Lfo, NoiseGenerator};
use super::mixer::{ChannelMask, Mixer, PCM_SLOT};
use super::operator::OperatorRole;
use super::patch::Patch;
use super::registers::{Register, RegisterBank, SlotAddress};
use super::tables::Tables;
use crate::config::ChipConfig;
use crate::pcm::{PcmDecoder, SilentPcm};
use crate::Result;

/// First channel taken over by the rhythm section when rhythm mode is on
const RHYTHM_FIRST_CHANNEL: usize = 6;

/// Key-on bit of registers 0xB0-0xB8
const KEY_ON_BIT: u8 = 0x20;

/// Y8950 FM sound chip
///
/// Generic over the sample channel decoder; [`SilentPcm`] by default.
pub struct Y8950<P: PcmDecoder = SilentPcm> {
    config: ChipConfig,
    tables: Tables,
    channels: [Channel; NUM_CHANNELS],
    registers: RegisterBank,
    lfo: Lfo,
    noise: NoiseGenerator,
    mixer: Mixer,
    rhythm_mode: bool,
    /// Address latch of the indirect I/O protocol
    selected_reg: u8,
    pcm: P,
}

impl<P: PcmDecoder> Y8950<P> {
    /// Create a chip for an input clock and an output rate
    ///
    /// # Arguments
    ///
    /// * `clock` - Input clock in Hz (3,579,545 on MSX-AUDIO)
    /// * `sample_rate` - Output rate in Hz
    ///
    /// # Errors
    ///
    /// Returns [`crate::Y8950Error::ConfigError`] if the pair cannot drive the
    /// table generators.
    pub fn new(clock: u32, sample_rate: u32) -> Result<Self> {
        Self::from_config(ChipConfig::new(clock, sample_rate))
    }

    /// Create a chip from a configuration, with a freshly created decoder
    pub fn from_config(config: ChipConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, P::new(config.clock, config.sample_rate)))
    }

    /// Create a chip that drives the given PCM decoder
    pub fn with_pcm(config: ChipConfig, pcm: P) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, pcm))
    }

    fn build(config: ChipConfig, pcm: P) -> Self {
        debug!(
            "creating Y8950: clock {} Hz, output {} Hz",
            config.clock, config.sample_rate
        );
        let mut chip = Self {
            config,
            tables: Tables::acquire(config.clock, config.sample_rate),
            channels: std::array::from_fn(|_| Channel::new()),
            registers: RegisterBank::new(),
            lfo: Lfo::new(),
            noise: NoiseGenerator::new(),
            mixer: Mixer::new(),
            rhythm_mode: false,
            selected_reg: 0,
            pcm,
        };
        chip.reset();
        chip
    }

    /// Reset every runtime state except the mute mask
    ///
    /// Patches are cleared along with the register image, so voices have to
    /// be reprogrammed through register writes.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.lfo.reset();
        self.noise.reset();
        self.rhythm_mode = false;
        self.registers.reset();
        self.mixer.reset();
        self.selected_reg = 0;
        self.pcm.reset();
        debug!("Y8950 reset");
    }

    /// Change the output rate
    ///
    /// Rate-dependent tables are swapped and every operator's derived
    /// increments are recomputed; patches are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Y8950Error::ConfigError`] for a zero rate; the chip is
    /// left unchanged.
    pub fn set_rate(&mut self, sample_rate: u32) -> Result<()> {
        let config = ChipConfig::new(self.config.clock, sample_rate);
        config.validate()?;

        self.tables = self.tables.with_rate(sample_rate);
        self.config = config;
        for channel in &mut self.channels {
            channel.update_all(&self.tables);
        }
        self.pcm.set_rate(sample_rate);
        debug!("Y8950 output rate set to {sample_rate} Hz");
        Ok(())
    }

    /// Write a register
    ///
    /// Every write is archived in the register image, recognized or not.
    ///
    /// # Arguments
    ///
    /// * `addr` - Register address (0x00-0xFF)
    /// * `value` - Register value
    pub fn write_register(&mut self, addr: u8, value: u8) {
        match Register::decode(addr) {
            Register::Pcm(addr) => self.pcm.write_register(addr, value),
            Register::OperatorMode(slot) => self.update_operator(slot, |p| p.set_mode(value)),
            Register::KeyScaleLevel(slot) => self.update_operator(slot, |p| p.set_level(value)),
            Register::AttackDecay(slot) => {
                self.update_operator(slot, |p| p.set_attack_decay(value))
            }
            Register::SustainRelease(slot) => {
                self.update_operator(slot, |p| p.set_sustain_release(value))
            }
            Register::FnumLow(ch) => {
                let high = self.registers.read(addr + 0x10) as u32 & 3;
                let fnum = (high << 8) | value as u32;
                let channel = &mut self.channels[ch];
                channel.set_frequency(fnum, channel.block());
                channel.update_all(&self.tables);
            }
            Register::FnumHighBlock(ch) => {
                let fnum = ((value as u32 & 3) << 8) | self.registers.read(addr - 0x10) as u32;
                let block = (value as u32 >> 2) & 7;
                let was_keyed = self.registers.read(addr) & KEY_ON_BIT != 0;
                let keyed = value & KEY_ON_BIT != 0;

                let channel = &mut self.channels[ch];
                channel.set_frequency(fnum, block);
                match (was_keyed, keyed) {
                    (false, true) => channel.key_on(),
                    (true, false) => channel.key_off(&self.tables),
                    _ => {}
                }
                channel.update_all(&self.tables);
            }
            Register::FeedbackAlgorithm(ch) => {
                let channel = &mut self.channels[ch];
                channel
                    .operator_mut(OperatorRole::Modulator)
                    .patch_mut()
                    .set_feedback(value);
                channel.set_algorithm(Algorithm::from_register(value));
            }
            Register::Control => {
                self.lfo.set_depths(value & 0x80 != 0, value & 0x40 != 0);
                let rhythm = value & 0x20 != 0;
                if rhythm != self.rhythm_mode {
                    debug!("rhythm mode {}", if rhythm { "on" } else { "off" });
                }
                self.rhythm_mode = rhythm;
            }
            Register::Unmapped(addr) => {
                trace!("write to unmapped register 0x{addr:02X} = 0x{value:02X}");
            }
        }

        self.registers.write(addr, value);
    }

    fn update_operator(&mut self, slot: SlotAddress, apply: impl FnOnce(&mut Patch)) {
        let op = self.channels[slot.channel].operator_mut(slot.role);
        apply(op.patch_mut());
        op.update_all(&self.tables);
    }

    /// Last value written to a register
    #[inline]
    pub fn read_register(&self, addr: u8) -> u8 {
        self.registers.read(addr)
    }

    /// Write through the indirect I/O protocol
    ///
    /// Even ports latch an address, odd ports write data to the latched
    /// address.
    pub fn write_io(&mut self, port: u8, value: u8) {
        if port & 1 != 0 {
            self.write_register(self.selected_reg, value);
        } else {
            self.selected_reg = value;
        }
    }

    /// Read the register image at the latched address
    #[inline]
    pub fn read_io(&self) -> u8 {
        self.registers.read(self.selected_reg)
    }

    /// Generate one output sample
    pub fn tick(&mut self) -> i16 {
        let lfo = self.lfo.tick(&self.tables);
        self.noise.tick();

        let melodic = if self.rhythm_mode {
            RHYTHM_FIRST_CHANNEL
        } else {
            NUM_CHANNELS
        };

        // Rhythm-owned channels still decay to zero instead of holding their last level
        for (i, channel) in self.channels.iter_mut().enumerate() {
            let contribution = if i < melodic && !self.mixer.is_muted(i) && !channel.is_finished()
            {
                channel.calc(&self.tables, lfo)
            } else {
                0
            };
            self.mixer.latch(i, contribution);
        }

        let pcm = if self.mixer.is_muted(PCM_SLOT) {
            0
        } else {
            self.pcm.calc() as i32
        };
        self.mixer.latch(PCM_SLOT, pcm);

        self.mixer.mix()
    }

    /// Generate a block of samples
    pub fn generate_samples(&mut self, count: usize) -> Vec<i16> {
        let mut samples = vec![0; count];
        self.generate_samples_into(&mut samples);
        samples
    }

    /// Fill a buffer with consecutive samples
    pub fn generate_samples_into(&mut self, buffer: &mut [i16]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick();
        }
    }

    /// Replace the mute mask, returning the previous one
    pub fn set_mask(&mut self, mask: ChannelMask) -> ChannelMask {
        self.mixer.set_mask(mask)
    }

    /// Flip mute bits, returning the previous mask
    pub fn toggle_mask(&mut self, mask: ChannelMask) -> ChannelMask {
        self.mixer.toggle_mask(mask)
    }

    /// Current mute mask
    #[inline]
    pub fn mask(&self) -> ChannelMask {
        self.mixer.mask()
    }

    /// Status byte of the PCM decoder
    #[inline]
    pub fn status(&self) -> u8 {
        self.pcm.status()
    }

    /// Inspect a channel
    ///
    /// # Panics
    ///
    /// Panics if `index` is 9 or more.
    #[inline]
    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index]
    }

    /// Latched output of a stream (0-8 FM, 9-13 rhythm, 14 PCM)
    ///
    /// # Panics
    ///
    /// Panics if `index` is 15 or more.
    #[inline]
    pub fn channel_output(&self, index: usize) -> i16 {
        self.mixer.output(index)
    }

    /// True when channels 6-8 are handed to the rhythm section
    #[inline]
    pub fn is_rhythm_mode(&self) -> bool {
        self.rhythm_mode
    }

    /// Current configuration
    #[inline]
    pub fn config(&self) -> ChipConfig {
        self.config
    }

    /// Tables the chip currently reads
    #[inline]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// The PCM decoder
    #[inline]
    pub fn pcm(&self) -> &P {
        &self.pcm
    }

    /// The PCM decoder, mutably (e.g. to load sample memory)
    #[inline]
    pub fn pcm_mut(&mut self) -> &mut P {
        &mut self.pcm
    }
}

impl<P: PcmDecoder> Default for Y8950<P> {
    fn default() -> Self {
        let config = ChipConfig::default();
        Self::build(config, P::new(config.clock, config.sample_rate))
    }
}

impl<P: PcmDecoder> std::fmt::Debug for Y8950<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Y8950")
            .field("config", &self.config)
            .field("rhythm_mode", &self.rhythm_mode)
            .field("mask", &self.mixer.mask())
            .field("selected_reg", &self.selected_reg)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::y8950::constants::{
        AM_DP_WIDTH, AM_PG_WIDTH, DP_WIDTH, EG_DP_WIDTH, PM_AMP_BITS, PM_DP_WIDTH, PM_PG_WIDTH,
    };
    use crate::y8950::envelope::EnvelopeState;

    fn chip() -> Y8950 {
        Y8950::new(3_579_545, 44_100).unwrap()
    }

    /// Sustained sine voice on channel `ch`, loud and instant attack
    fn program_voice(chip: &mut Y8950, ch: u8) {
        let (group, k) = (ch / 3, ch % 3);
        let modulator = group * 8 + k;
        let carrier = modulator + 3;
        for op in [modulator, carrier] {
            chip.write_register(0x20 + op, 0x21);
            chip.write_register(0x40 + op, 0x00);
            chip.write_register(0x60 + op, 0xF0);
            chip.write_register(0x80 + op, 0x0F);
        }
        chip.write_register(0xA0 + ch, 0x41);
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(Y8950::<SilentPcm>::new(3_579_545, 0).is_err());
        assert!(Y8950::<SilentPcm>::new(10, 44_100).is_err());
    }

    #[test]
    fn test_default_chip_is_silent() {
        let mut chip: Y8950 = Y8950::default();
        assert!(chip.generate_samples(256).iter().all(|&s| s == 0));
        assert_eq!(chip.status(), 0);
    }

    #[test]
    fn test_register_image_archives_everything() {
        let mut chip = chip();
        chip.write_register(0xFF, 0x5A);
        chip.write_register(0x26, 0x11);
        chip.write_register(0x08, 0x80);
        assert_eq!(chip.read_register(0xFF), 0x5A);
        assert_eq!(chip.read_register(0x26), 0x11);
        assert_eq!(chip.read_register(0x08), 0x80);
        assert_eq!(chip.pcm().read_register(0x08), 0x80);
    }

    #[test]
    fn test_fnumber_reconstruction() {
        let mut chip = chip();
        chip.write_register(0xB4, 0x1E); // block 7, high bits 2, no key
        chip.write_register(0xA4, 0x34);
        assert_eq!(chip.channel(4).fnumber(), 0x234);
        assert_eq!(chip.channel(4).block(), 7);

        chip.write_register(0xB4, 0x01); // block 0, high bits 1
        assert_eq!(chip.channel(4).fnumber(), 0x134);
        assert_eq!(chip.channel(4).block(), 0);
        assert_eq!(
            chip.channel(4).carrier().phase_increment(),
            chip.tables().phase_increment(0x134, 0, 0)
        );
    }

    #[test]
    fn test_key_on_is_edge_triggered() {
        let mut chip = chip();
        program_voice(&mut chip, 0);
        chip.write_register(0xB0, 0x32);
        assert!(chip.channel(0).is_keyed());
        chip.generate_samples(8);

        let carrier = chip.channel(0).carrier();
        let (state, phase) = (carrier.envelope_state(), carrier.envelope_phase());
        assert_ne!(state, EnvelopeState::Attack);
        let osc_phase = carrier.phase();

        // Same value again: no restart
        chip.write_register(0xB0, 0x32);
        let carrier = chip.channel(0).carrier();
        assert_eq!(carrier.envelope_state(), state);
        assert_eq!(carrier.envelope_phase(), phase);
        assert_eq!(carrier.phase(), osc_phase);
    }

    #[test]
    fn test_key_off_is_edge_triggered() {
        let mut chip = chip();
        program_voice(&mut chip, 1);
        chip.write_register(0xB1, 0x32);
        chip.generate_samples(4);
        chip.write_register(0xB1, 0x12);
        assert!(!chip.channel(1).is_keyed());
        assert_eq!(chip.channel(1).carrier().envelope_state(), EnvelopeState::Release);

        chip.generate_samples(4);
        let phase = chip.channel(1).carrier().envelope_phase();
        chip.write_register(0xB1, 0x12);
        assert_eq!(chip.channel(1).carrier().envelope_phase(), phase);

        // Writing a cleared key bit to an idle channel never keys it off
        chip.write_register(0xB2, 0x00);
        assert_eq!(chip.channel(2).carrier().envelope_state(), EnvelopeState::Finish);
    }

    #[test]
    fn test_indirect_io() {
        let mut chip = chip();
        chip.write_io(0, 0xA3);
        chip.write_io(1, 0x77);
        assert_eq!(chip.read_register(0xA3), 0x77);
        assert_eq!(chip.read_io(), 0x77);
        assert_eq!(chip.channel(3).fnumber(), 0x77);

        chip.write_io(2, 0x20);
        assert_eq!(chip.read_io(), 0);
        chip.write_io(3, 0x21);
        assert_eq!(chip.read_io(), 0x21);
        assert_eq!(chip.channel(0).modulator().patch().multiplier, 1);
    }

    #[test]
    fn test_feedback_and_algorithm() {
        let mut chip = chip();
        chip.write_register(0xC5, 0x0B);
        let ch = chip.channel(5);
        assert_eq!(ch.modulator().patch().feedback, 5);
        assert_eq!(ch.carrier().patch().feedback, 0);
        assert_eq!(ch.algorithm(), Algorithm::Additive);
    }

    #[test]
    fn test_control_register() {
        let mut chip = chip();
        chip.write_register(0xBD, 0xE0);
        assert!(chip.is_rhythm_mode());
        chip.write_register(0xBD, 0x00);
        assert!(!chip.is_rhythm_mode());
    }

    /// Run a sustained sine on channel 0's carrier with the given mode bits
    /// (0x20 register) and return it once the envelope holds at full volume
    fn held_carrier(mode: u8) -> Y8950 {
        let mut chip = chip();
        program_voice(&mut chip, 0);
        chip.write_register(0x23, mode);
        chip.write_register(0xB0, 0x32);
        for _ in 0..16 {
            chip.tick();
        }
        assert_eq!(
            chip.channel(0).carrier().envelope_state(),
            EnvelopeState::SusHold
        );
        chip
    }

    /// Largest minus smallest carrier attenuation over one LFO period
    fn attenuation_swing(chip: &mut Y8950) -> u32 {
        let period = AM_DP_WIDTH / chip.tables().rate_tables().am_increment() + 2;
        let (mut lo, mut hi) = (u32::MAX, 0);
        for _ in 0..period {
            chip.tick();
            let attenuation = chip.channel(0).carrier().attenuation();
            lo = lo.min(attenuation);
            hi = hi.max(attenuation);
        }
        hi - lo
    }

    /// Largest minus smallest per-sample carrier phase step over one LFO period
    fn phase_step_spread(chip: &mut Y8950) -> u32 {
        let period = PM_DP_WIDTH / chip.tables().rate_tables().pm_increment() + 2;
        let (mut lo, mut hi) = (u32::MAX, 0);
        for _ in 0..period {
            let before = chip.channel(0).carrier().phase();
            chip.tick();
            let step = chip.channel(0).carrier().phase().wrapping_sub(before) & (DP_WIDTH - 1);
            lo = lo.min(step);
            hi = hi.max(step);
        }
        hi - lo
    }

    #[test]
    fn test_control_register_selects_am_depth() {
        let mut chip = held_carrier(0xA1); // AM, sustained, MUL 1
        let fixed = chip.tables().clock_tables();
        let table_swing = |deep: bool| {
            let values: Vec<i32> = (0..AM_PG_WIDTH).map(|i| fixed.am(deep, i)).collect();
            let hi = values.iter().copied().max().unwrap_or(0);
            let lo = values.iter().copied().min().unwrap_or(0);
            (hi - lo) as u32
        };
        let (deep, shallow) = (table_swing(true), table_swing(false));
        assert!(deep > shallow);
        assert!(shallow > 0);

        chip.write_register(0xBD, 0x80);
        assert_eq!(attenuation_swing(&mut chip), deep);

        chip.write_register(0xBD, 0x00);
        assert_eq!(attenuation_swing(&mut chip), shallow);
    }

    #[test]
    fn test_control_register_selects_pm_depth() {
        let mut chip = held_carrier(0x61); // PM, sustained, MUL 1
        let base = chip.channel(0).carrier().phase_increment();
        let fixed = chip.tables().clock_tables();
        let table_spread = |deep: bool| {
            let steps: Vec<u32> = (0..PM_PG_WIDTH)
                .map(|i| base.wrapping_mul(fixed.pm(deep, i) as u32) >> PM_AMP_BITS)
                .collect();
            let hi = steps.iter().copied().max().unwrap_or(0);
            let lo = steps.iter().copied().min().unwrap_or(0);
            hi - lo
        };
        let (deep, shallow) = (table_spread(true), table_spread(false));
        assert!(deep > shallow);

        chip.write_register(0xBD, 0x40);
        assert_eq!(phase_step_spread(&mut chip), deep);

        chip.write_register(0xBD, 0x00);
        assert_eq!(phase_step_spread(&mut chip), shallow);

        // Without the PM bit the step never moves
        chip.write_register(0x23, 0x21);
        chip.write_register(0xBD, 0x40);
        assert_eq!(phase_step_spread(&mut chip), 0);
    }

    /// Channel 0 carrier at block 7, F-number 0x3FF, KSR on (rate scale 15),
    /// slow attack; returns once its envelope phase sits where adding
    /// `jump` would carry past bit 23
    fn attack_near_overflow(chip: &mut Y8950, jump: u32) {
        assert!(jump > EG_DP_WIDTH);
        chip.write_register(0x23, 0x31); // sustained, KSR, MUL 1
        chip.write_register(0x63, 0x10); // AR 1
        chip.write_register(0xA0, 0xFF);
        chip.write_register(0xB0, 0x3F); // key on, block 7, fnum 0x3FF
        assert_eq!(chip.channel(0).carrier().rate_scale(), 15);

        let window = (1 << 24) - jump..EG_DP_WIDTH;
        let mut ticks = 0;
        while !window.contains(&chip.channel(0).carrier().envelope_phase()) {
            chip.tick();
            ticks += 1;
            assert!(ticks < 200_000, "attack never reached {window:?}");
            assert_eq!(
                chip.channel(0).carrier().envelope_state(),
                EnvelopeState::Attack
            );
        }
    }

    #[test]
    fn test_fast_attack_at_low_rate_enters_decay() {
        let mut chip: Y8950 = Y8950::new(3_579_545, 8_000).unwrap();
        let jump = chip.tables().rate_tables().attack_increment(14, 15);
        attack_near_overflow(&mut chip, jump);

        chip.write_register(0x63, 0xE0); // AR 14 mid-attack
        assert_eq!(chip.channel(0).carrier().envelope_increment(), jump);
        chip.tick();
        assert_eq!(
            chip.channel(0).carrier().envelope_state(),
            EnvelopeState::Decay
        );
        chip.generate_samples(64);
    }

    #[test]
    fn test_rate_drop_during_attack_enters_decay() {
        let mut chip = chip();
        let jump = Tables::acquire(3_579_545, 8_000)
            .rate_tables()
            .attack_increment(14, 15);
        attack_near_overflow(&mut chip, jump);

        chip.write_register(0x63, 0xE0);
        chip.set_rate(8_000).unwrap();
        assert_eq!(chip.channel(0).carrier().envelope_increment(), jump);
        chip.tick();
        assert_eq!(
            chip.channel(0).carrier().envelope_state(),
            EnvelopeState::Decay
        );
    }

    #[test]
    fn test_rhythm_mode_silences_upper_channels() {
        let mut chip = chip();
        program_voice(&mut chip, 7);
        chip.write_register(0xB7, 0x32);
        chip.write_register(0xBD, 0x20);
        let samples = chip.generate_samples(64);
        assert!(samples.iter().all(|&s| s == 0));
        assert_eq!(chip.channel_output(7), 0);
    }

    #[test]
    fn test_rhythm_mode_lets_upper_latches_decay() {
        let mut chip = chip();
        program_voice(&mut chip, 7);
        chip.write_register(0xB7, 0x32);
        let mut ticks = 0;
        while chip.channel_output(7) == 0 {
            chip.tick();
            ticks += 1;
            assert!(ticks < 64);
        }

        chip.write_register(0xBD, 0x20);
        chip.generate_samples(32);
        assert!((-1..=0).contains(&chip.channel_output(7)));
    }

    #[test]
    fn test_reset_clears_state_but_keeps_mask() {
        let mut chip = chip();
        program_voice(&mut chip, 0);
        chip.write_register(0xB0, 0x32);
        chip.write_register(0xBD, 0x20);
        chip.write_io(0, 0x40);
        chip.set_mask(ChannelMask::CH3);
        chip.generate_samples(16);

        chip.reset();
        assert_eq!(chip.read_register(0xB0), 0);
        assert_eq!(chip.read_io(), chip.read_register(0x00));
        assert!(!chip.is_rhythm_mode());
        assert_eq!(chip.mask(), ChannelMask::CH3);
        let ch = chip.channel(0);
        assert!(!ch.is_keyed());
        assert_eq!(ch.carrier().envelope_state(), EnvelopeState::Finish);
        assert_eq!(ch.carrier().patch(), &Patch::default());
        assert_eq!(chip.tick(), 0);
    }

    #[test]
    fn test_set_rate_refreshes_increments() {
        let mut chip = chip();
        program_voice(&mut chip, 0);
        chip.write_register(0xB0, 0x32);
        let before = chip.channel(0).operator(OperatorRole::Carrier).phase_increment();

        chip.set_rate(22_050).unwrap();
        let after = chip.channel(0).carrier().phase_increment();
        assert_eq!(after, chip.tables().phase_increment(0x241, 4, 1));
        assert!(after > before);
        assert_eq!(chip.config().sample_rate, 22_050);
        // Patch data survives
        assert_eq!(chip.channel(0).carrier().patch().attack, 15);

        assert!(chip.set_rate(0).is_err());
        assert_eq!(chip.config().sample_rate, 22_050);
    }

    #[test]
    fn test_channel_output_latches() {
        let mut chip = chip();
        program_voice(&mut chip, 2);
        chip.write_register(0xB2, 0x32);
        let mut sounded = false;
        for _ in 0..64 {
            chip.tick();
            sounded |= chip.channel_output(2) != 0;
            assert_eq!(chip.channel_output(0), 0);
        }
        assert!(sounded);
    }
}
