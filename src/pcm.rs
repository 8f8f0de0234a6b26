//! PCM decoder seam
//!
//! The Y8950 carries a delta-PCM sample channel next to its FM voices. Its
//! address generator, sample memory and timer hooks form a separate
//! subsystem; the FM core only talks to it through [`PcmDecoder`].

/// Register window owned by the PCM decoder (0x07-0x12)
pub const PCM_REGISTER_FIRST: u8 = 0x07;
/// Last register address owned by the PCM decoder
pub const PCM_REGISTER_LAST: u8 = 0x12;

/// Interface the FM core calls into for the sample channel
///
/// Implementations are owned by the device, reset alongside it, and asked
/// for exactly one sample per device tick.
///
/// # Example
///
/// ```
/// use y8950::{PcmDecoder, Y8950, ChipConfig};
///
/// struct Constant(i16);
///
/// impl PcmDecoder for Constant {
///     fn new(_clock: u32, _sample_rate: u32) -> Self {
///         Constant(0)
///     }
///     fn set_rate(&mut self, _sample_rate: u32) {}
///     fn reset(&mut self) {}
///     fn write_register(&mut self, _addr: u8, _value: u8) {}
///     fn calc(&mut self) -> i16 {
///         self.0
///     }
///     fn status(&self) -> u8 {
///         0
///     }
/// }
///
/// let mut chip = Y8950::with_pcm(ChipConfig::default(), Constant(1000)).unwrap();
/// assert_eq!(chip.tick(), 500);
/// ```
pub trait PcmDecoder: Send {
    /// Create a decoder for the given input clock and output rate
    fn new(clock: u32, sample_rate: u32) -> Self
    where
        Self: Sized;

    /// Change the output rate
    fn set_rate(&mut self, sample_rate: u32);

    /// Return to power-on state
    fn reset(&mut self);

    /// Write one of the decoder's registers
    ///
    /// # Arguments
    ///
    /// * `addr` - Register address inside the PCM window (0x07-0x12)
    /// * `value` - Register value
    fn write_register(&mut self, addr: u8, value: u8);

    /// Produce the next sample, called once per device tick
    fn calc(&mut self) -> i16;

    /// Status byte (end-of-playback / busy flags)
    fn status(&self) -> u8;
}

/// Decoder that never plays anything
///
/// Archives writes to its register window so hosts can read them back, and
/// always reports silence with a clear status byte. Used when the host does
/// not emulate the sample channel.
#[derive(Clone, Debug, Default)]
pub struct SilentPcm {
    registers: [u8; (PCM_REGISTER_LAST - PCM_REGISTER_FIRST + 1) as usize],
}

impl SilentPcm {
    /// Read back a register of the PCM window (0 outside of it)
    pub fn read_register(&self, addr: u8) -> u8 {
        if (PCM_REGISTER_FIRST..=PCM_REGISTER_LAST).contains(&addr) {
            self.registers[(addr - PCM_REGISTER_FIRST) as usize]
        } else {
            0
        }
    }
}

impl PcmDecoder for SilentPcm {
    fn new(_clock: u32, _sample_rate: u32) -> Self {
        Self::default()
    }

    fn set_rate(&mut self, _sample_rate: u32) {}

    fn reset(&mut self) {
        self.registers = Default::default();
    }

    fn write_register(&mut self, addr: u8, value: u8) {
        if (PCM_REGISTER_FIRST..=PCM_REGISTER_LAST).contains(&addr) {
            self.registers[(addr - PCM_REGISTER_FIRST) as usize] = value;
        }
    }

    fn calc(&mut self) -> i16 {
        0
    }

    fn status(&self) -> u8 {
        0
    }
}
