//! Y8950 (MSX-AUDIO) FM Sound Chip Emulator
//!
//! A cycle-accurate reproduction of the Yamaha Y8950: 9 two-operator FM
//! voices driven through a byte-wide register map, plus a seam for the
//! chip's delta-PCM sample channel. Hosts feed it register writes and pull
//! one quantized 16-bit sample per call at a fixed output rate.
//!
//! # Features
//! - Bit-exact quantization tables (log-sine, dB-to-linear, attack curve, KSL, rate tables)
//! - Full envelope generator state machine with key-on/key-off edge detection
//! - Pitch and amplitude LFOs with both depth presets
//! - FM and additive channel topologies with modulator self-feedback
//! - Per-channel mute masks and per-channel output latches
//! - Immutable, reference-counted lookup tables shared between devices
//!
//! # Crate feature flags
//! - `export-wav` (default): register script rendering to WAV (`script`, `export`, `y8950` CLI)
//! - `serde` (opt-in): serialization of [`ChipConfig`]
//!
//! # Quick start
//! ```
//! use y8950::Y8950;
//!
//! let mut chip: Y8950 = Y8950::new(3_579_545, 44_100).unwrap();
//! chip.write_register(0x20, 0x21); // Modulator: sustained, multiplier 1
//! chip.write_register(0x23, 0x21); // Carrier: sustained, multiplier 1
//! chip.write_register(0x60, 0xF0); // Modulator attack 15
//! chip.write_register(0x63, 0xF0); // Carrier attack 15
//! chip.write_register(0xA0, 0x41); // F-number low
//! chip.write_register(0xB0, 0x32); // Key on, block 4, F-number high
//! let sample = chip.tick();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod pcm;
pub mod y8950; // Y8950 FM emulation (core)

#[cfg(feature = "export-wav")]
pub mod export; // WAV rendering
#[cfg(feature = "export-wav")]
pub mod script; // Register write scripts

/// Error types for Y8950 emulator operations
#[derive(thiserror::Error, Debug)]
pub enum Y8950Error {
    /// Error while parsing a register script
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Y8950Error {
    /// Converts a String into `Y8950Error::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `ParseError`, ...) where the
    /// failure has a known cause.
    fn from(msg: String) -> Self {
        Y8950Error::Other(msg)
    }
}

impl From<&str> for Y8950Error {
    /// Converts a string slice into `Y8950Error::Other`.
    fn from(msg: &str) -> Self {
        Y8950Error::Other(msg.to_string())
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, Y8950Error>;

// Public API exports
pub use config::ChipConfig;
pub use pcm::{PcmDecoder, SilentPcm};
pub use y8950::{
    Algorithm, Channel, ChannelMask, EnvelopeState, Operator, OperatorRole, Patch, Tables, Y8950,
};

#[cfg(feature = "export-wav")]
pub use export::{export_to_wav, write_wav_file};
#[cfg(feature = "export-wav")]
pub use script::{parse_script, run_script, ScriptCommand};
