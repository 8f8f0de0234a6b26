//! Quantization tables
//!
//! Every numeric lookup the FM core consults is generated here from the
//! input clock and output rate alone:
//!
//! - clock tables: log-sine waveform, dB-to-linear conversion, attack curve,
//!   key scale level, rate scale offsets and the two LFO depth presets
//! - rate tables: phase increments for the phase generator, envelope
//!   increments for attack and decay/release, LFO phase increments
//!
//! Generation is pure. Built table sets are immutable and shared through a
//! process-wide cache of weak references, so devices configured alike reuse
//! one allocation and devices configured differently never disturb each
//! other.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use log::{debug, trace};
use parking_lot::Mutex;

use super::constants::{
    AM_DEPTHS, AM_DP_WIDTH, AM_PG_WIDTH, AM_SPEED, DB2LIN_AMP_BITS, DB_MUTE, DB_STEP,
    DP_BITS, EG_DP_WIDTH, EG_MUTE, EG_STEP, KSL_DB_TABLE, MULTIPLIER_TABLE, PG_WIDTH, PM_AMP,
    PM_DEPTHS, PM_DP_WIDTH, PM_PG_WIDTH, PM_SPEED, TL_BITS, TL_TO_EG_STEPS,
};
use crate::config::CLOCK_DIVIDER;

/// dB-to-linear table length: positive half plus negated mirror
const DB2LIN_LEN: usize = DB_MUTE as usize * 4;
/// F-number high nibble x block x total level x key scale selector
const TLL_LEN: usize = 16 * 8 * (1 << TL_BITS) * 4;
/// F-number x block x multiplier
const DPHASE_LEN: usize = 1024 * 8 * 16;

/// Tables that only depend on the input clock
#[derive(Clone, PartialEq, Eq)]
pub struct ClockTables {
    sine: Box<[u32]>,
    db2lin: Box<[i32]>,
    attack_curve: Box<[u32]>,
    tll: Box<[u32]>,
    rks: [[[u32; 2]; 8]; 2],
    pm: [[i32; PM_PG_WIDTH]; 2],
    am: [[i32; AM_PG_WIDTH]; 2],
}

impl ClockTables {
    /// Generate all clock tables
    pub fn build() -> Self {
        Self {
            sine: make_sine_table(),
            db2lin: make_db2lin_table(),
            attack_curve: make_attack_curve(),
            tll: make_tll_table(),
            rks: make_rks_table(),
            pm: make_pm_tables(),
            am: make_am_tables(),
        }
    }

    /// Log-domain waveform value (negative half offset by 2 x DB_MUTE)
    #[inline]
    pub fn sine(&self, index: usize) -> u32 {
        self.sine[index & (PG_WIDTH - 1)]
    }

    /// Signed linear amplitude for a waveform value plus attenuation
    #[inline]
    pub fn db2lin(&self, index: usize) -> i32 {
        self.db2lin[index]
    }

    /// Attack-curve attenuation for an envelope output value (0-511)
    #[inline]
    pub fn attack_curve(&self, index: usize) -> u32 {
        self.attack_curve[index]
    }

    /// Combined key scale level and total level attenuation
    ///
    /// # Arguments
    ///
    /// * `fnum_hi` - Top four bits of the 10-bit F-number
    /// * `block` - Octave (0-7)
    /// * `tl` - Total level (0-63)
    /// * `ksl` - Key scale level selector (0-3)
    #[inline]
    pub fn total_level(&self, fnum_hi: u32, block: u32, tl: u32, ksl: u32) -> u32 {
        self.tll[tll_index(fnum_hi as usize, block as usize, tl as usize, ksl as usize)]
    }

    /// Envelope rate scale offset (0-15)
    #[inline]
    pub fn rate_scale(&self, fnum_msb: u32, block: u32, ksr: bool) -> u32 {
        self.rks[fnum_msb as usize & 1][block as usize & 7][ksr as usize]
    }

    /// Pitch LFO factor (fixed point, 256 = unity)
    #[inline]
    pub fn pm(&self, deep: bool, index: usize) -> i32 {
        self.pm[deep as usize][index]
    }

    /// Amplitude LFO attenuation in envelope steps
    #[inline]
    pub fn am(&self, deep: bool, index: usize) -> i32 {
        self.am[deep as usize][index]
    }
}

impl fmt::Debug for ClockTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockTables")
            .field("sine_len", &self.sine.len())
            .field("db2lin_len", &self.db2lin.len())
            .finish_non_exhaustive()
    }
}

/// Tables that depend on both clock and output rate
#[derive(Clone, PartialEq, Eq)]
pub struct RateTables {
    dphase: Box<[u32]>,
    attack: [[u32; 16]; 16],
    decay: [[u32; 16]; 16],
    pm_increment: u32,
    am_increment: u32,
}

impl RateTables {
    /// Generate all rate tables for a clock/rate pair
    pub fn build(clock: u32, sample_rate: u32) -> Self {
        let adjust = |x: f64| rate_adjust(x, clock, sample_rate);
        let native_rate = (clock / CLOCK_DIVIDER) as f64;
        Self {
            dphase: make_dphase_table(&adjust),
            attack: make_attack_rates(&adjust),
            decay: make_decay_rates(&adjust),
            pm_increment: adjust(PM_SPEED * PM_DP_WIDTH as f64 / native_rate),
            am_increment: adjust(AM_SPEED * AM_DP_WIDTH as f64 / native_rate),
        }
    }

    /// Phase generator increment
    ///
    /// # Arguments
    ///
    /// * `fnum` - 10-bit F-number
    /// * `block` - Octave (0-7)
    /// * `multiplier` - Multiplier index (0-15)
    #[inline]
    pub fn phase_increment(&self, fnum: u32, block: u32, multiplier: u32) -> u32 {
        self.dphase[dphase_index(fnum as usize, block as usize, multiplier as usize)]
    }

    /// Envelope increment while attacking
    #[inline]
    pub fn attack_increment(&self, rate: usize, rks: usize) -> u32 {
        self.attack[rate][rks]
    }

    /// Envelope increment while decaying or releasing
    #[inline]
    pub fn decay_increment(&self, rate: usize, rks: usize) -> u32 {
        self.decay[rate][rks]
    }

    /// Pitch LFO phase increment per sample
    #[inline]
    pub fn pm_increment(&self) -> u32 {
        self.pm_increment
    }

    /// Amplitude LFO phase increment per sample
    #[inline]
    pub fn am_increment(&self) -> u32 {
        self.am_increment
    }
}

impl fmt::Debug for RateTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateTables")
            .field("pm_increment", &self.pm_increment)
            .field("am_increment", &self.am_increment)
            .finish_non_exhaustive()
    }
}

/// Handle on the table set for one (clock, rate) configuration
///
/// Cloning is cheap; the underlying tables are shared and never mutated.
///
/// # Example
///
/// ```
/// use y8950::Tables;
///
/// let a = Tables::acquire(3_579_545, 44_100);
/// let b = Tables::acquire(3_579_545, 44_100);
/// assert_eq!(a.phase_increment(0x200, 4, 1), b.phase_increment(0x200, 4, 1));
/// ```
#[derive(Clone)]
pub struct Tables {
    clock: u32,
    sample_rate: u32,
    fixed: Arc<ClockTables>,
    rates: Arc<RateTables>,
}

impl Tables {
    /// Get the shared tables for a configuration, building them if needed
    pub fn acquire(clock: u32, sample_rate: u32) -> Self {
        let mut cache = table_cache().lock();
        let fixed = cache.clock_tables(clock);
        let rates = cache.rate_tables(clock, sample_rate);
        Self {
            clock,
            sample_rate,
            fixed,
            rates,
        }
    }

    /// Same clock tables, rate tables for another output rate
    pub fn with_rate(&self, sample_rate: u32) -> Self {
        let rates = table_cache().lock().rate_tables(self.clock, sample_rate);
        Self {
            clock: self.clock,
            sample_rate,
            fixed: Arc::clone(&self.fixed),
            rates,
        }
    }

    /// Input clock these tables were built for
    pub fn clock(&self) -> u32 {
        self.clock
    }

    /// Output rate these tables were built for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Clock-dependent half of the set
    #[inline]
    pub fn clock_tables(&self) -> &ClockTables {
        &self.fixed
    }

    /// Rate-dependent half of the set
    #[inline]
    pub fn rate_tables(&self) -> &RateTables {
        &self.rates
    }

    /// See [`RateTables::phase_increment`]
    #[inline]
    pub fn phase_increment(&self, fnum: u32, block: u32, multiplier: u32) -> u32 {
        self.rates.phase_increment(fnum, block, multiplier)
    }

    /// True if both handles point at the very same table allocations
    pub fn shares_storage_with(&self, other: &Tables) -> bool {
        Arc::ptr_eq(&self.fixed, &other.fixed) && Arc::ptr_eq(&self.rates, &other.rates)
    }
}

impl fmt::Debug for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tables")
            .field("clock", &self.clock)
            .field("sample_rate", &self.sample_rate)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Shared cache
// =============================================================================

#[derive(Default)]
struct TableCache {
    clock: HashMap<u32, Weak<ClockTables>>,
    rates: HashMap<(u32, u32), Weak<RateTables>>,
}

impl TableCache {
    fn clock_tables(&mut self, clock: u32) -> Arc<ClockTables> {
        if let Some(tables) = self.clock.get(&clock).and_then(Weak::upgrade) {
            trace!("clock tables for {clock} Hz served from cache");
            return tables;
        }
        debug!("building clock tables for {clock} Hz");
        let tables = Arc::new(ClockTables::build());
        self.clock.retain(|_, weak| weak.strong_count() > 0);
        self.clock.insert(clock, Arc::downgrade(&tables));
        tables
    }

    fn rate_tables(&mut self, clock: u32, sample_rate: u32) -> Arc<RateTables> {
        let key = (clock, sample_rate);
        if let Some(tables) = self.rates.get(&key).and_then(Weak::upgrade) {
            trace!("rate tables for {clock} Hz / {sample_rate} Hz served from cache");
            return tables;
        }
        debug!("building rate tables for {clock} Hz / {sample_rate} Hz");
        let tables = Arc::new(RateTables::build(clock, sample_rate));
        self.rates.retain(|_, weak| weak.strong_count() > 0);
        self.rates.insert(key, Arc::downgrade(&tables));
        tables
    }
}

fn table_cache() -> &'static Mutex<TableCache> {
    static CACHE: OnceLock<Mutex<TableCache>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(TableCache::default()))
}

// =============================================================================
// Generators
// =============================================================================

/// Scale a chip-rate quantity to the host output rate, rounding to nearest
#[inline]
fn rate_adjust(x: f64, clock: u32, sample_rate: u32) -> u32 {
    (x * clock as f64 / CLOCK_DIVIDER as f64 / sample_rate as f64 + 0.5) as u32
}

#[inline]
fn tll_index(fnum_hi: usize, block: usize, tl: usize, ksl: usize) -> usize {
    ((((fnum_hi & 15) * 8 + (block & 7)) << TL_BITS) + (tl & 63)) * 4 + (ksl & 3)
}

#[inline]
fn dphase_index(fnum: usize, block: usize, multiplier: usize) -> usize {
    ((fnum & 1023) * 8 + (block & 7)) * 16 + (multiplier & 15)
}

/// Linear amplitude (0.0-1.0) to attenuation steps, 511 for silence
fn lin2db(d: f64) -> u32 {
    if d == 0.0 {
        DB_MUTE - 1
    } else {
        (-((20.0 * d.log10() / DB_STEP) as i32)).min(DB_MUTE as i32 - 1) as u32
    }
}

fn make_sine_table() -> Box<[u32]> {
    let mut table = vec![0u32; PG_WIDTH];

    for i in 0..PG_WIDTH / 4 {
        table[i] = lin2db((2.0 * PI * i as f64 / PG_WIDTH as f64).sin());
    }
    for i in 0..PG_WIDTH / 4 {
        table[PG_WIDTH / 2 - 1 - i] = table[i];
    }
    for i in 0..PG_WIDTH / 2 {
        table[PG_WIDTH / 2 + i] = DB_MUTE + DB_MUTE + table[i];
    }

    table.into_boxed_slice()
}

fn make_db2lin_table() -> Box<[i32]> {
    let mute = DB_MUTE as usize;
    let full_scale = ((1 << DB2LIN_AMP_BITS) - 1) as f64;
    let mut table = vec![0i32; DB2LIN_LEN];

    for i in 0..mute * 2 {
        let value = if i >= mute {
            0
        } else {
            (full_scale * 10f64.powf(-(i as f64) * DB_STEP / 20.0)) as i32
        };
        table[i] = value;
        table[i + mute * 2] = -value;
    }

    table.into_boxed_slice()
}

fn make_attack_curve() -> Box<[u32]> {
    let width = EG_MUTE as f64;
    let mut table = vec![0u32; EG_MUTE as usize];

    table[0] = EG_MUTE;
    for (i, entry) in table.iter_mut().enumerate().skip(1) {
        let value = width - 1.0 - width * (i as f64).ln() / width.ln();
        *entry = (value as u32) >> 1;
    }

    table.into_boxed_slice()
}

fn make_pm_tables() -> [[i32; PM_PG_WIDTH]; 2] {
    let mut tables = [[0i32; PM_PG_WIDTH]; 2];
    for (table, depth) in tables.iter_mut().zip(PM_DEPTHS) {
        for (i, entry) in table.iter_mut().enumerate() {
            let angle = 2.0 * PI * i as f64 / PM_PG_WIDTH as f64;
            *entry = (PM_AMP * 2f64.powf(depth * angle.sin() / 1200.0)) as i32;
        }
    }
    tables
}

fn make_am_tables() -> [[i32; AM_PG_WIDTH]; 2] {
    let mut tables = [[0i32; AM_PG_WIDTH]; 2];
    for (table, depth) in tables.iter_mut().zip(AM_DEPTHS) {
        for (i, entry) in table.iter_mut().enumerate() {
            // Divides by the pitch table width; both are 256 on this chip
            let angle = 2.0 * PI * i as f64 / PM_PG_WIDTH as f64;
            *entry = (depth / 2.0 / DB_STEP * (1.0 + angle.sin())) as i32;
        }
    }
    tables
}

fn make_tll_table() -> Box<[u32]> {
    let tl_steps = TL_TO_EG_STEPS;
    let mut table = vec![0u32; TLL_LEN];

    for fnum_hi in 0..16usize {
        // KSL base in half-dB units
        let ksl_base = (KSL_DB_TABLE[fnum_hi] * 2.0) as i32;
        for block in 0..8usize {
            let tmp = ksl_base - 6 * (7 - block as i32);
            for tl in 0..(1usize << TL_BITS) {
                let level = tl as u32 * tl_steps;
                for ksl in 0..4usize {
                    table[tll_index(fnum_hi, block, tl, ksl)] = if ksl == 0 || tmp <= 0 {
                        level
                    } else {
                        ((tmp >> (3 - ksl)) as f64 / EG_STEP) as u32 + level
                    };
                }
            }
        }
    }

    table.into_boxed_slice()
}

fn make_rks_table() -> [[[u32; 2]; 8]; 2] {
    let mut table = [[[0u32; 2]; 8]; 2];
    for (fnum_msb, by_block) in table.iter_mut().enumerate() {
        for (block, entry) in by_block.iter_mut().enumerate() {
            entry[0] = block as u32 >> 1;
            entry[1] = ((block as u32) << 1) + fnum_msb as u32;
        }
    }
    table
}

fn make_dphase_table(adjust: &impl Fn(f64) -> u32) -> Box<[u32]> {
    let mut table = vec![0u32; DPHASE_LEN];

    for fnum in 0..1024usize {
        for block in 0..8usize {
            for (ml, &mul) in MULTIPLIER_TABLE.iter().enumerate() {
                let raw = ((fnum as u32 * mul) << block) >> (21 - DP_BITS);
                table[dphase_index(fnum, block, ml)] = adjust(raw as f64);
            }
        }
    }

    table.into_boxed_slice()
}

fn make_attack_rates(adjust: &impl Fn(f64) -> u32) -> [[u32; 16]; 16] {
    let mut table = [[0u32; 16]; 16];
    for (rate, row) in table.iter_mut().enumerate() {
        for (rks, entry) in row.iter_mut().enumerate() {
            let rm = (rate + (rks >> 2)).min(15);
            let rl = rks & 3;
            *entry = match rate {
                0 => 0,
                15 => EG_DP_WIDTH,
                _ => adjust(((3 * (rl + 4)) << (rm + 1)) as f64),
            };
        }
    }
    table
}

fn make_decay_rates(adjust: &impl Fn(f64) -> u32) -> [[u32; 16]; 16] {
    let mut table = [[0u32; 16]; 16];
    for (rate, row) in table.iter_mut().enumerate() {
        for (rks, entry) in row.iter_mut().enumerate() {
            let rm = (rate + (rks >> 2)).min(15);
            let rl = rks & 3;
            *entry = match rate {
                0 => 0,
                _ => adjust(((rl + 4) << (rm - 1)) as f64),
            };
        }
    }
    table
}
