//! Y8950 Hardware Constants
//!
//! Fixed-point widths and quantization steps shared by the table generators
//! and the per-operator state machines. None of these are configurable: they
//! pin the emulation to the chip's numeric behavior.

/// Number of melodic channels
pub const NUM_CHANNELS: usize = 9;

/// Number of operators (two per channel)
pub const NUM_OPERATORS: usize = NUM_CHANNELS * 2;

/// Waveform table index width
pub const PG_BITS: u32 = 10;
/// Waveform table length
pub const PG_WIDTH: usize = 1 << PG_BITS;

/// Operator phase accumulator width
pub const DP_BITS: u32 = 19;
/// Operator phase accumulator modulus
pub const DP_WIDTH: u32 = 1 << DP_BITS;
/// Fractional bits dropped to form the waveform index
pub const DP_BASE_BITS: u32 = DP_BITS - PG_BITS;

/// Attenuation quantum in dB (output side)
pub const DB_STEP: f64 = 0.1875;
/// Attenuation range in bits
pub const DB_BITS: u32 = 9;
/// First attenuation value that is silent
pub const DB_MUTE: u32 = 1 << DB_BITS;

/// Attenuation quantum in dB (envelope side)
pub const EG_STEP: f64 = 0.1875;
/// Envelope output width
pub const EG_BITS: u32 = 9;
/// First envelope output that is silent
pub const EG_MUTE: u32 = 1 << EG_BITS;
/// Loudest-to-silent envelope output clamp
pub const EG_MAX: u32 = EG_MUTE - 1;

/// Total level quantum in dB
pub const TL_STEP: f64 = 0.75;
/// Total level width
pub const TL_BITS: u32 = 6;

/// Sustain level quantum in dB
pub const SL_STEP: f64 = 3.0;

/// Linear output magnitude width
pub const DB2LIN_AMP_BITS: u32 = 11;

/// Envelope phase accumulator width
pub const EG_DP_BITS: u32 = 23;
/// Envelope phase full scale (attack overflow bit)
pub const EG_DP_WIDTH: u32 = 1 << EG_DP_BITS;
/// Fractional bits dropped to form the envelope output
pub const EG_DP_SHIFT: u32 = EG_DP_BITS - EG_BITS;

/// Pitch LFO table index width
pub const PM_PG_BITS: u32 = 8;
/// Pitch LFO table length
pub const PM_PG_WIDTH: usize = 1 << PM_PG_BITS;
/// Pitch LFO phase accumulator width
pub const PM_DP_BITS: u32 = 16;
/// Pitch LFO phase accumulator modulus
pub const PM_DP_WIDTH: u32 = 1 << PM_DP_BITS;

/// Amplitude LFO table index width
pub const AM_PG_BITS: u32 = 8;
/// Amplitude LFO table length
pub const AM_PG_WIDTH: usize = 1 << AM_PG_BITS;
/// Amplitude LFO phase accumulator width
pub const AM_DP_BITS: u32 = 16;
/// Amplitude LFO phase accumulator modulus
pub const AM_DP_WIDTH: u32 = 1 << AM_DP_BITS;

/// Pitch LFO factor is fixed point with this many fractional bits
pub const PM_AMP_BITS: u32 = 8;
/// Pitch LFO unity factor
pub const PM_AMP: f64 = (1 << PM_AMP_BITS) as f64;

/// Pitch LFO speed in Hz
pub const PM_SPEED: f64 = 6.4;
/// Pitch LFO depths in cents (shallow, deep)
pub const PM_DEPTHS: [f64; 2] = [13.75 / 2.0, 13.75];

/// Amplitude LFO speed in Hz
pub const AM_SPEED: f64 = 3.7;
/// Amplitude LFO depths in dB (shallow, deep)
pub const AM_DEPTHS: [f64; 2] = [1.0, 4.8];

/// Frequency multiplier table in half units (index 0 is x0.5)
pub const MULTIPLIER_TABLE: [u32; 16] = [1, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 20, 24, 24, 30, 30];

/// Key scale level base attenuation per F-number high nibble, in dB
pub const KSL_DB_TABLE: [f64; 16] = [
    0.000, 9.000, 12.000, 13.875, 15.000, 16.125, 16.875, 17.625, 18.000, 18.750, 19.125, 19.500,
    19.875, 20.250, 20.625, 21.000,
];

/// Release rate used for percussive (non-sustained) patches after key-off
pub const PERCUSSIVE_RELEASE_RATE: usize = 7;

/// Envelope steps per total level step (`TL_STEP / EG_STEP`)
pub const TL_TO_EG_STEPS: u32 = 4;

/// Attenuation steps per envelope step (`EG_STEP / DB_STEP`)
pub const EG_TO_DB_STEPS: u32 = 1;

/// Envelope steps per sustain level step (`SL_STEP / EG_STEP`)
pub const SL_TO_EG_STEPS: u32 = 16;

/// Sustain level thresholds in envelope phase units
///
/// Levels step by 3 dB; index 15 jumps to 93 dB.
pub const SUSTAIN_LEVELS: [u32; 16] = sustain_levels();

const fn sustain_levels() -> [u32; 16] {
    let mut table = [0u32; 16];
    let mut i = 0;
    while i < 16 {
        let level = if i == 15 { 31 } else { i as u32 };
        table[i] = (level * SL_TO_EG_STEPS) << EG_DP_SHIFT;
        i += 1;
    }
    table
}
