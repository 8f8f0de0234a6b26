//! Register write scripts
//!
//! A plain-text way to drive the chip without a host emulator. One command
//! per line:
//!
//! ```text
//! # channel 0, sine carrier
//! w 23 21     register write: address and value in hex
//! w b0 32
//! t 44100     run: number of samples to render, decimal
//! ```
//!
//! Blank lines and everything after `#` are ignored.

use crate::pcm::PcmDecoder;
use crate::y8950::Y8950;
use crate::{Result, Y8950Error};

/// One script step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Write a register
    Write {
        /// Register address
        addr: u8,
        /// Register value
        value: u8,
    },
    /// Render this many samples
    Wait(u32),
}

/// Parse a script
///
/// # Errors
///
/// Returns [`Y8950Error::ParseError`] naming the first offending line.
///
/// # Examples
///
/// ```
/// use y8950::{parse_script, ScriptCommand};
///
/// let commands = parse_script("w 0x20 21\nt 10 # ten samples\n").unwrap();
/// assert_eq!(commands[0], ScriptCommand::Write { addr: 0x20, value: 0x21 });
/// assert_eq!(commands[1], ScriptCommand::Wait(10));
/// ```
pub fn parse_script(text: &str) -> Result<Vec<ScriptCommand>> {
    let mut commands = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let command = match tokens.as_slice() {
            ["w" | "W", addr, value] => ScriptCommand::Write {
                addr: parse_hex_byte(addr, line_no)?,
                value: parse_hex_byte(value, line_no)?,
            },
            ["t" | "T", count] => ScriptCommand::Wait(count.parse().map_err(|_| {
                Y8950Error::ParseError(format!("line {line_no}: invalid sample count '{count}'"))
            })?),
            _ => {
                return Err(Y8950Error::ParseError(format!(
                    "line {line_no}: expected 'w <addr> <value>' or 't <samples>', found '{line}'"
                )))
            }
        };
        commands.push(command);
    }

    Ok(commands)
}

fn parse_hex_byte(token: &str, line_no: usize) -> Result<u8> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u8::from_str_radix(digits, 16).map_err(|_| {
        Y8950Error::ParseError(format!("line {line_no}: invalid hex byte '{token}'"))
    })
}

/// Apply a script to a chip and collect the rendered samples
///
/// Writes are applied between samples, in order.
pub fn run_script<P: PcmDecoder>(chip: &mut Y8950<P>, commands: &[ScriptCommand]) -> Vec<i16> {
    let total: usize = commands
        .iter()
        .map(|c| match c {
            ScriptCommand::Wait(n) => *n as usize,
            ScriptCommand::Write { .. } => 0,
        })
        .sum();
    let mut samples = Vec::with_capacity(total);

    for command in commands {
        match *command {
            ScriptCommand::Write { addr, value } => chip.write_register(addr, value),
            ScriptCommand::Wait(count) => {
                samples.extend((0..count).map(|_| chip.tick()));
            }
        }
    }

    samples
}
