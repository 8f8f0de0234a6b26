//! Y8950 Register Definitions
//!
//! Decodes the byte-wide register map into the field it controls. Operator
//! registers come in four 0x20-wide ranges whose offsets map to operators
//! through a fixed, sparse table; channel registers come in three 9-wide
//! ranges.

use std::fmt;

use super::operator::OperatorRole;
use crate::pcm::{PCM_REGISTER_FIRST, PCM_REGISTER_LAST};

/// Global control register: AM depth(7) PM depth(6) rhythm(5)
pub const CONTROL_REGISTER: u8 = 0xBD;

/// Operator selected by an offset inside an operator register range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotAddress {
    /// Channel index (0-8)
    pub channel: usize,
    /// Modulator or carrier
    pub role: OperatorRole,
}

const SLOT_MAP: [Option<SlotAddress>; 32] = build_slot_map();

const fn build_slot_map() -> [Option<SlotAddress>; 32] {
    let mut map = [None; 32];
    let mut group = 0;
    while group < 3 {
        let mut k = 0;
        while k < 6 {
            map[group * 8 + k] = Some(SlotAddress {
                channel: group * 3 + k % 3,
                role: if k < 3 {
                    OperatorRole::Modulator
                } else {
                    OperatorRole::Carrier
                },
            });
            k += 1;
        }
        group += 1;
    }
    map
}

impl SlotAddress {
    /// Look up an offset (0x00-0x1F) within an operator register range
    #[inline]
    pub fn from_offset(offset: u8) -> Option<Self> {
        SLOT_MAP[(offset & 0x1F) as usize]
    }
}

/// Decoded meaning of a register address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Sample channel register, forwarded to the PCM decoder (0x07-0x12)
    Pcm(u8),
    /// AM, PM, envelope type, KSR and multiplier (0x20-0x35)
    OperatorMode(SlotAddress),
    /// Key scale level and total level (0x40-0x55)
    KeyScaleLevel(SlotAddress),
    /// Attack and decay rates (0x60-0x75)
    AttackDecay(SlotAddress),
    /// Sustain level and release rate (0x80-0x95)
    SustainRelease(SlotAddress),
    /// F-number low byte (0xA0-0xA8)
    FnumLow(usize),
    /// Key, block and F-number high bits (0xB0-0xB8)
    FnumHighBlock(usize),
    /// Modulator feedback and channel topology (0xC0-0xC8)
    FeedbackAlgorithm(usize),
    /// LFO depths and rhythm mode (0xBD)
    Control,
    /// Anything else; archived only
    Unmapped(u8),
}

impl Register {
    /// Decode a register address
    pub fn decode(addr: u8) -> Self {
        let slot = |base: u8, make: fn(SlotAddress) -> Register| {
            SlotAddress::from_offset(addr - base).map_or(Register::Unmapped(addr), make)
        };

        match addr {
            PCM_REGISTER_FIRST..=PCM_REGISTER_LAST => Register::Pcm(addr),
            0x20..=0x3F => slot(0x20, Register::OperatorMode),
            0x40..=0x5F => slot(0x40, Register::KeyScaleLevel),
            0x60..=0x7F => slot(0x60, Register::AttackDecay),
            0x80..=0x9F => slot(0x80, Register::SustainRelease),
            0xA0..=0xA8 => Register::FnumLow((addr - 0xA0) as usize),
            0xB0..=0xB8 => Register::FnumHighBlock((addr - 0xB0) as usize),
            CONTROL_REGISTER => Register::Control,
            0xC0..=0xC8 => Register::FeedbackAlgorithm((addr - 0xC0) as usize),
            _ => Register::Unmapped(addr),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = |r: OperatorRole| match r {
            OperatorRole::Modulator => "modulator",
            OperatorRole::Carrier => "carrier",
        };
        match self {
            Register::Pcm(addr) => write!(f, "PCM register 0x{addr:02X}"),
            Register::OperatorMode(s) => {
                write!(f, "AM/PM/EG/KSR/MUL (channel {} {})", s.channel, role(s.role))
            }
            Register::KeyScaleLevel(s) => {
                write!(f, "KSL/TL (channel {} {})", s.channel, role(s.role))
            }
            Register::AttackDecay(s) => write!(f, "AR/DR (channel {} {})", s.channel, role(s.role)),
            Register::SustainRelease(s) => {
                write!(f, "SL/RR (channel {} {})", s.channel, role(s.role))
            }
            Register::FnumLow(ch) => write!(f, "F-number low (channel {ch})"),
            Register::FnumHighBlock(ch) => write!(f, "KEY/BLOCK/F-number high (channel {ch})"),
            Register::FeedbackAlgorithm(ch) => write!(f, "FB/CON (channel {ch})"),
            Register::Control => write!(f, "AM depth/PM depth/rhythm"),
            Register::Unmapped(addr) => write!(f, "unmapped register 0x{addr:02X}"),
        }
    }
}

/// Register image: last value written to every address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBank {
    /// Register values 0x00-0xFF
    pub registers: [u8; 256],
}

impl RegisterBank {
    /// Create a new register bank with all values set to 0
    pub fn new() -> Self {
        RegisterBank {
            registers: [0; 256],
        }
    }

    /// Read a register value
    #[inline]
    pub fn read(&self, addr: u8) -> u8 {
        self.registers[addr as usize]
    }

    /// Write a register value
    #[inline]
    pub fn write(&mut self, addr: u8, value: u8) {
        self.registers[addr as usize] = value;
    }

    /// Clear every register
    pub fn reset(&mut self) {
        self.registers = [0; 256];
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}
