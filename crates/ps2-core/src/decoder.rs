//! PS/2 frame decoder: edge-driven shift register with timeout framing.
//!
//! A frame is 11 bits sampled on falling edges of the debounced device clock:
//! a low start bit, eight payload bits least-significant first, an odd parity
//! bit and a high stop bit. The device clock idling high for the configured
//! timeout ends the frame, and only then is it validated.

use crate::FrameError;

/// Number of bits in one PS/2 frame.
pub const FRAME_BITS: u8 = 11;

const PARITY_BIT: u8 = 9;
const STOP_BIT: u8 = 10;

/// Returns the parity bit that gives `payload` odd parity.
#[must_use]
pub const fn odd_parity_bit(payload: u8) -> bool {
    payload.count_ones() % 2 == 0
}

/// Validates a complete frame and extracts its payload.
///
/// Bit 0 of `frame` is the first bit received.
///
/// # Errors
///
/// Returns [`FrameError::StartBit`], [`FrameError::Parity`] or
/// [`FrameError::StopBit`], checked in that order.
#[allow(clippy::cast_possible_truncation)]
pub const fn validate_frame(frame: u16) -> Result<u8, FrameError> {
    let payload = (frame >> 1) as u8;
    let parity = (frame >> PARITY_BIT) & 1 == 1;
    let stop = (frame >> STOP_BIT) & 1 == 1;

    if frame & 1 != 0 {
        return Err(FrameError::StartBit);
    }
    if (payload.count_ones() + parity as u32) % 2 == 0 {
        return Err(FrameError::Parity);
    }
    if !stop {
        return Err(FrameError::StopBit);
    }
    Ok(payload)
}

/// Decoder state machine tag with per-state registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FrameState {
    /// Waiting for the first falling clock edge of a frame.
    #[default]
    Idle,
    /// Collecting bits of a frame in progress.
    Shifting {
        /// Received bits, first bit in bit 0.
        bits: u16,
        /// Number of bits received so far (`1..=11`).
        count: u8,
        /// Consecutive clock-high ticks since the last falling edge.
        timeout: u32,
    },
    /// End of frame reached with all bits present; validated next tick.
    FrameTimeout {
        /// The complete received frame.
        bits: u16,
    },
}

/// Payload output register of the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedByte {
    /// Last accepted payload; holds its value between frames.
    pub value: u8,
    /// High for exactly the tick after a frame passes validation.
    pub valid: bool,
}

/// Result of one decoder tick: the next registers plus any frame verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderStep {
    /// Registers to commit at the end of the tick.
    pub next: FrameDecoder,
    /// Frame accepted or discarded during this tick, if any.
    pub verdict: Option<Result<u8, FrameError>>,
}

/// Registers of the frame decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FrameDecoder {
    state: FrameState,
    prev_clock: bool,
    output: DecodedByte,
}

impl FrameDecoder {
    /// Returns the current state machine tag.
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    /// Returns the payload output register.
    #[must_use]
    pub const fn output(&self) -> DecodedByte {
        self.output
    }

    /// Returns the payload while the valid pulse is high.
    #[must_use]
    pub const fn decoded(&self) -> Option<u8> {
        if self.output.valid {
            Some(self.output.value)
        } else {
            None
        }
    }

    /// Computes the registers after one tick from the debounced lines.
    #[must_use]
    pub fn step(&self, clock: bool, data: bool, timeout_ticks: u32) -> DecoderStep {
        let falling = self.prev_clock && !clock;
        let mut next = Self {
            state: self.state,
            prev_clock: clock,
            output: DecodedByte {
                value: self.output.value,
                valid: false,
            },
        };
        let mut verdict = None;

        next.state = match self.state {
            FrameState::Idle if falling => first_bit(data),
            FrameState::Idle => FrameState::Idle,
            FrameState::Shifting { bits, count, .. } if falling => {
                if count >= FRAME_BITS {
                    verdict = Some(Err(FrameError::Overrun));
                    first_bit(data)
                } else {
                    FrameState::Shifting {
                        bits: bits | (u16::from(data) << count),
                        count: count + 1,
                        timeout: 0,
                    }
                }
            }
            FrameState::Shifting {
                bits,
                count,
                timeout,
            } if clock => {
                let timeout = timeout.saturating_add(1);
                if timeout < timeout_ticks {
                    FrameState::Shifting {
                        bits,
                        count,
                        timeout,
                    }
                } else if count == FRAME_BITS {
                    FrameState::FrameTimeout { bits }
                } else {
                    verdict = Some(Err(FrameError::Truncated { bits: count }));
                    FrameState::Idle
                }
            }
            FrameState::Shifting { .. } => self.state,
            FrameState::FrameTimeout { bits } => {
                let checked = validate_frame(bits);
                if let Ok(value) = checked {
                    next.output = DecodedByte { value, valid: true };
                }
                verdict = Some(checked);
                if falling {
                    first_bit(data)
                } else {
                    FrameState::Idle
                }
            }
        };

        DecoderStep { next, verdict }
    }
}

const fn first_bit(data: bool) -> FrameState {
    FrameState::Shifting {
        bits: data as u16,
        count: 1,
        timeout: 0,
    }
}
