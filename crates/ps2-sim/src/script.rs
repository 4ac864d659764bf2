//! Line-oriented stimulus script parser.
//!
//! One command per line. `#` starts a comment; blank lines are ignored.
//!
//! ```text
//! idle <ticks>
//! rate <hz>
//! send <byte> [bad-parity|bad-start|bad-stop|no-stop]
//! partial <byte> <bits>
//! read [ticks]
//! clear
//! reset
//! expect <byte>
//! ```

use ps2_core::{FrameShape, Ps2Timing};

use crate::errors::{ScriptError, ScriptErrorKind};

/// Default width of a `read` strobe in ticks.
pub const DEFAULT_READ_TICKS: u32 = 2;

/// One parsed script command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Hold the bus idle.
    Idle {
        /// Number of ticks.
        ticks: u32,
    },
    /// Change the device clock used by later frames.
    Rate {
        /// Device clock frequency.
        timing: Ps2Timing,
    },
    /// Transmit one frame and wait out the end-of-frame timeout.
    Send {
        /// Payload byte.
        byte: u8,
        /// Bit layout, possibly defective.
        shape: FrameShape,
    },
    /// Raise the host read request.
    Read {
        /// Width of the request in ticks.
        ticks: u32,
    },
    /// Pulse the interrupt clear strobe.
    Clear,
    /// Pulse global reset.
    Reset,
    /// Check the byte returned by the most recent read.
    Expect {
        /// Expected host data bus value.
        byte: u8,
    },
}

/// A command together with its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-indexed line number.
    pub number: usize,
    /// Parsed command.
    pub command: Command,
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns the first [`ScriptError`] encountered.
pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let command = parse_command(text).map_err(|kind| ScriptError::new(number, kind))?;
        lines.push(ScriptLine { number, command });
    }
    Ok(lines)
}

fn parse_command(text: &str) -> Result<Command, ScriptErrorKind> {
    let mut words = text.split_whitespace();
    let name = words.next().unwrap_or_default();

    let command = match name {
        "idle" => Command::Idle {
            ticks: parse_number(required(words.next(), "idle", "a tick count")?)?,
        },
        "rate" => {
            let hz = parse_number(required(words.next(), "rate", "a clock rate in Hz")?)?;
            let timing = Ps2Timing::from_clock_hz(hz)
                .filter(Ps2Timing::is_supported)
                .ok_or(ScriptErrorKind::UnsupportedRate { hz })?;
            Command::Rate { timing }
        }
        "send" => {
            let byte = parse_byte(required(words.next(), "send", "a byte")?)?;
            let shape = match words.next() {
                None => FrameShape::Valid,
                Some("bad-parity") => FrameShape::BadParity,
                Some("bad-start") => FrameShape::BadStart,
                Some("bad-stop") => FrameShape::BadStop,
                Some("no-stop") => FrameShape::MissingStop,
                Some(other) => return Err(ScriptErrorKind::UnknownOption(other.to_string())),
            };
            Command::Send { byte, shape }
        }
        "partial" => {
            let byte = parse_byte(required(words.next(), "partial", "a byte")?)?;
            let bits = parse_byte(required(words.next(), "partial", "a payload bit count")?)?;
            if bits > 7 {
                return Err(ScriptErrorKind::PartialBits(bits));
            }
            Command::Send {
                byte,
                shape: FrameShape::Partial { payload_bits: bits },
            }
        }
        "read" => Command::Read {
            ticks: words
                .next()
                .map_or(Ok(DEFAULT_READ_TICKS), parse_number)?,
        },
        "clear" => Command::Clear,
        "reset" => Command::Reset,
        "expect" => Command::Expect {
            byte: parse_byte(required(words.next(), "expect", "a byte")?)?,
        },
        other => return Err(ScriptErrorKind::UnknownCommand(other.to_string())),
    };

    match words.next() {
        Some(extra) => Err(ScriptErrorKind::UnexpectedArgument(extra.to_string())),
        None => Ok(command),
    }
}

fn required<'a>(
    word: Option<&'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, ScriptErrorKind> {
    word.ok_or(ScriptErrorKind::MissingArgument { command, expected })
}

fn parse_number(word: &str) -> Result<u32, ScriptErrorKind> {
    let parsed = match word
        .strip_prefix("0x")
        .or_else(|| word.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => word.parse(),
    };
    parsed.map_err(|_| ScriptErrorKind::InvalidNumber(word.to_string()))
}

fn parse_byte(word: &str) -> Result<u8, ScriptErrorKind> {
    parse_number(word)
        .ok()
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| ScriptErrorKind::InvalidNumber(word.to_string()))
}
