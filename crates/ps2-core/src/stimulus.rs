//! Tick-level waveform generation for the PS/2 lines and host strobes, plus a
//! sampling receiver for the debug serial line.
//!
//! A device-to-host PS/2 bit is driven as the device does it: the data line is
//! set while the clock is high for half a period, then the clock is pulled low
//! for the other half. The receiver samples on that falling edge.

use crate::decoder::{odd_parity_bit, FRAME_BITS};
use crate::timing::{half_period_ticks, CORE_CLOCK_HZ, PS2_CLOCK_MAX_HZ, PS2_CLOCK_MIN_HZ};
use crate::{Ps2Core, TickInputs, TickOutputs, TraceSink};

const SLOWEST_HALF_PERIOD: u32 = CORE_CLOCK_HZ / (PS2_CLOCK_MIN_HZ * 2);

/// PS/2 device clock timing expressed in core ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ps2Timing {
    half_period: u32,
}

impl Default for Ps2Timing {
    /// The slowest supported device clock.
    fn default() -> Self {
        Self {
            half_period: SLOWEST_HALF_PERIOD,
        }
    }
}

impl Ps2Timing {
    /// Builds timing from an explicit half period in ticks.
    #[must_use]
    pub const fn from_half_period(ticks: u32) -> Self {
        Self {
            half_period: if ticks == 0 { 1 } else { ticks },
        }
    }

    /// Builds timing for a device clock of `clock_hz`.
    #[must_use]
    pub fn from_clock_hz(clock_hz: u32) -> Option<Self> {
        half_period_ticks(clock_hz).map(Self::from_half_period)
    }

    /// Returns the half period in ticks.
    #[must_use]
    pub const fn half_period(&self) -> u32 {
        self.half_period
    }

    /// Returns true when the clock lies in the supported 10 to 16.7 kHz band.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        let fastest = half_period_ticks(PS2_CLOCK_MAX_HZ).unwrap_or(1);
        let slowest = half_period_ticks(PS2_CLOCK_MIN_HZ).unwrap_or(u32::MAX);
        (fastest..=slowest).contains(&self.half_period)
    }
}

/// Bit layout of a generated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameShape {
    /// Start, payload, odd parity, stop.
    Valid,
    /// Parity bit inverted.
    BadParity,
    /// Start bit sent high.
    BadStart,
    /// Stop bit sent low.
    BadStop,
    /// Stop bit never sent: 10 bits.
    MissingStop,
    /// Start bit plus only the first `payload_bits` payload bits.
    Partial {
        /// Number of payload bits sent (clamped to 8).
        payload_bits: u8,
    },
}

impl FrameShape {
    /// Returns the line levels of each bit in transmission order.
    #[must_use]
    pub fn bits(self, payload: u8) -> Vec<bool> {
        let data_bits = match self {
            Self::Partial { payload_bits } => payload_bits.min(8),
            _ => 8,
        };
        let mut bits = Vec::with_capacity(usize::from(FRAME_BITS));
        bits.push(matches!(self, Self::BadStart));
        bits.extend((0..data_bits).map(|i| (payload >> i) & 1 == 1));

        let parity = odd_parity_bit(payload);
        match self {
            Self::Valid | Self::BadStart => bits.extend([parity, true]),
            Self::BadParity => bits.extend([!parity, true]),
            Self::BadStop => bits.extend([parity, false]),
            Self::MissingStop => bits.push(parity),
            Self::Partial { .. } => {}
        }
        bits
    }
}

/// Appends per-tick input samples for scripted scenarios.
#[derive(Debug, Clone, Default)]
pub struct StimulusBuilder {
    timing: Ps2Timing,
    ticks: Vec<TickInputs>,
}

impl StimulusBuilder {
    /// Creates an empty stimulus using `timing` for PS/2 bits.
    #[must_use]
    pub const fn new(timing: Ps2Timing) -> Self {
        Self {
            timing,
            ticks: Vec::new(),
        }
    }

    /// Changes the PS/2 timing used by subsequent bits.
    pub fn set_timing(&mut self, timing: Ps2Timing) -> &mut Self {
        self.timing = timing;
        self
    }

    /// Returns the number of ticks generated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Returns true when no ticks have been generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    fn push(&mut self, inputs: TickInputs, ticks: u32) {
        self.ticks.extend(std::iter::repeat_n(inputs, ticks as usize));
    }

    /// Holds both PS/2 lines released high for `ticks` ticks.
    pub fn idle(&mut self, ticks: u32) -> &mut Self {
        self.push(TickInputs::default(), ticks);
        self
    }

    /// Drives one PS/2 bit: data set with clock high, then clock low.
    pub fn bit(&mut self, level: bool) -> &mut Self {
        let high = TickInputs {
            ps2_data_raw: level,
            ..TickInputs::default()
        };
        let low = TickInputs {
            ps2_clock_raw: false,
            ..high
        };
        let half = self.timing.half_period;
        self.push(high, half);
        self.push(low, half);
        self
    }

    /// Drives each level in `levels` as one PS/2 bit.
    pub fn bits(&mut self, levels: &[bool]) -> &mut Self {
        for &level in levels {
            self.bit(level);
        }
        self
    }

    /// Drives a whole frame carrying `payload` with the given bit layout.
    pub fn frame(&mut self, payload: u8, shape: FrameShape) -> &mut Self {
        self.bits(&shape.bits(payload))
    }

    /// Holds the host read request high for `ticks` ticks.
    pub fn read_request(&mut self, ticks: u32) -> &mut Self {
        self.push(
            TickInputs {
                host_read_request: true,
                ..TickInputs::default()
            },
            ticks,
        );
        self
    }

    /// Holds the interrupt clear strobe high for `ticks` ticks.
    pub fn clear_interrupt(&mut self, ticks: u32) -> &mut Self {
        self.push(
            TickInputs {
                interrupt_clear: true,
                ..TickInputs::default()
            },
            ticks,
        );
        self
    }

    /// Holds reset for `ticks` ticks.
    ///
    /// The PS/2 clock is held at `clock_level`, which lets a scenario abort a
    /// frame with the clock still low.
    pub fn reset(&mut self, ticks: u32, clock_level: bool) -> &mut Self {
        self.push(
            TickInputs {
                ps2_clock_raw: clock_level,
                reset: true,
                ..TickInputs::default()
            },
            ticks,
        );
        self
    }

    /// Returns the generated ticks.
    #[must_use]
    pub fn build(&self) -> Vec<TickInputs> {
        self.ticks.clone()
    }
}

/// Applies every tick of `stimulus` to `core`, handing each tick's outputs to
/// `observe`. Returns the outputs of the last tick.
pub fn drive<S, F>(
    core: &mut Ps2Core,
    stimulus: &[TickInputs],
    sink: &mut S,
    mut observe: F,
) -> TickOutputs
where
    S: TraceSink + ?Sized,
    F: FnMut(&TickOutputs),
{
    let mut last = core.outputs();
    for inputs in stimulus {
        last = core.tick_traced(*inputs, sink);
        observe(&last);
    }
    last
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonitorState {
    Idle,
    Receiving { elapsed: u32, shift: u8 },
}

/// Mid-bit sampling receiver for an 8N1 serial line driven one sample per tick.
#[derive(Debug, Clone)]
pub struct SerialMonitor {
    divisor: u32,
    prev_line: bool,
    state: MonitorState,
    framing_errors: u32,
}

impl SerialMonitor {
    /// Creates a receiver for a line with a `divisor`-tick bit period.
    #[must_use]
    pub fn new(divisor: u16) -> Self {
        Self {
            divisor: u32::from(divisor.max(1)),
            prev_line: true,
            state: MonitorState::Idle,
            framing_errors: 0,
        }
    }

    /// Returns how many frames ended without a high stop bit.
    #[must_use]
    pub const fn framing_errors(&self) -> u32 {
        self.framing_errors
    }

    /// Feeds one tick's line level; returns a byte when a stop bit completes.
    pub fn sample(&mut self, line: bool) -> Option<u8> {
        let falling = self.prev_line && !line;
        self.prev_line = line;

        let (elapsed, shift) = match self.state {
            MonitorState::Idle if falling => (0, 0),
            MonitorState::Idle => return None,
            MonitorState::Receiving { elapsed, shift } => (elapsed + 1, shift),
        };
        self.state = MonitorState::Receiving { elapsed, shift };

        let half = self.divisor / 2;
        if elapsed < half || (elapsed - half) % self.divisor != 0 {
            return None;
        }
        match (elapsed - half) / self.divisor {
            0 if line => {
                self.state = MonitorState::Idle;
                None
            }
            0 => None,
            index @ 1..=8 => {
                let shift = shift | (u8::from(line) << (index - 1));
                self.state = MonitorState::Receiving { elapsed, shift };
                None
            }
            _ => {
                self.state = MonitorState::Idle;
                if line {
                    Some(shift)
                } else {
                    self.framing_errors = self.framing_errors.saturating_add(1);
                    None
                }
            }
        }
    }
}
