//! Discard reasons, queue faults and configuration errors.

use thiserror::Error;

/// Reasons a received frame is discarded without reaching the byte queue.
///
/// These never escape a tick. They classify silent drops for trace sinks and
/// diagnostic counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FrameError {
    /// First bit of the frame was not low.
    #[error("start bit was not low")]
    StartBit,
    /// Payload plus parity bit did not contain an odd number of ones.
    #[error("odd parity check failed")]
    Parity,
    /// Final bit of the frame was not high.
    #[error("stop bit was not high")]
    StopBit,
    /// End-of-frame timeout elapsed before all 11 bits arrived.
    #[error("frame truncated after {bits} bits")]
    Truncated {
        /// Number of bits collected before the timeout.
        bits: u8,
    },
    /// A twelfth clock edge arrived before the end-of-frame timeout.
    #[error("clock edge after a complete frame")]
    Overrun,
}

impl FrameError {
    /// Stable index used by per-reason diagnostic counters.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::StartBit => 0,
            Self::Parity => 1,
            Self::StopBit => 2,
            Self::Truncated { .. } => 3,
            Self::Overrun => 4,
        }
    }

    /// Number of distinct discard reasons.
    pub const KINDS: usize = 5;
}

/// Byte queue operation failures.
///
/// The composer maps both to no-ops: an overflow drops the incoming byte and
/// an underflow leaves the output register untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum QueueError {
    /// Enqueue attempted while every slot was occupied.
    #[error("byte queue full, dropped {dropped:#04x}")]
    Overflow {
        /// The byte that was not stored.
        dropped: u8,
    },
    /// Dequeue attempted while the queue held no bytes.
    #[error("byte queue empty")]
    Underflow,
}

/// Rejected core configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Debounce stability window must be at least one tick.
    #[error("debounce threshold must be non-zero")]
    ZeroDebounceThreshold,
    /// End-of-frame timeout must be at least one tick.
    #[error("frame timeout must be non-zero")]
    ZeroFrameTimeout,
    /// Debug serial bit period must be at least one tick.
    #[error("uart divisor must be non-zero")]
    ZeroUartDivisor,
    /// Telemetry settle delay must be at least one tick.
    #[error("telemetry settle delay must be non-zero")]
    ZeroSettleDelay,
}
