//! Error types for script parsing and simulator runs.
//!
//! Script errors carry the 1-indexed line they were found on and format as
//! `line N: message`, which the CLI prefixes with the script path.

use std::path::PathBuf;

use ps2_core::ConfigError;
use thiserror::Error;

/// A script line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ScriptError {
    /// 1-indexed line number.
    pub line: usize,
    /// What was wrong with the line.
    pub kind: ScriptErrorKind,
}

impl ScriptError {
    /// Creates an error for `line`.
    #[must_use]
    pub const fn new(line: usize, kind: ScriptErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Script parse failure kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptErrorKind {
    /// First word is not a known command.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// A required argument is absent.
    #[error("`{command}` expects {expected}")]
    MissingArgument {
        /// Command name.
        command: &'static str,
        /// Description of the missing argument.
        expected: &'static str,
    },
    /// Argument is not a decimal or `0x` hexadecimal number in range.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    /// `send` option is not one of the known frame defects.
    #[error("unknown frame option `{0}`")]
    UnknownOption(String),
    /// More arguments than the command accepts.
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
    /// `rate` outside the supported device clock band.
    #[error("clock rate {hz} Hz is outside the supported 10000..=16700 Hz band")]
    UnsupportedRate {
        /// Requested device clock frequency.
        hz: u32,
    },
    /// `partial` with a full payload or more.
    #[error("partial frames carry at most 7 payload bits, got {0}")]
    PartialBits(u8),
}

/// Failures that stop a simulator run before or while it executes.
#[derive(Debug, Error)]
pub enum SimError {
    /// A script or config file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid JSON for a core configuration.
    #[error("invalid config {}: {source}", .path.display())]
    ConfigJson {
        /// Config file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Script failed to parse.
    #[error("{}:{error}", .path.display())]
    Script {
        /// Script file path.
        path: PathBuf,
        /// Parse error with line number.
        #[source]
        error: ScriptError,
    },
    /// Configuration values were rejected by the core.
    #[error("invalid core config: {0}")]
    Config(#[from] ConfigError),
}
