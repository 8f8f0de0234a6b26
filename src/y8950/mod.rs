//! Y8950 FM emulation core
//!
//! Module layout follows the signal path:
//! - `tables`: quantization tables and their shared cache
//! - `lfo`: pitch/amplitude LFOs and the noise generator
//! - `envelope`, `patch`, `operator`, `channel`: voice synthesis
//! - `registers`: register map decoding and the register image
//! - `mixer`: output latches and the mute mask
//! - `chip`: the device

pub mod channel;
pub mod chip;
pub mod constants;
pub mod envelope;
pub mod lfo;
pub mod mixer;
pub mod operator;
pub mod patch;
pub mod registers;
pub mod tables;

pub use channel::{Algorithm, Channel};
pub use chip::Y8950;
pub use envelope::{Envelope, EnvelopeState};
pub use lfo::{Lfo, LfoOutput, NoiseGenerator};
pub use mixer::{ChannelMask, Mixer};
pub use operator::{Operator, OperatorRole};
pub use patch::Patch;
pub use registers::{Register, RegisterBank, SlotAddress};
pub use tables::{ClockTables, RateTables, Tables};
