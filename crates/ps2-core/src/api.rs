//! Public per-tick signal contract and trace hooks for embedding the core.

use crate::debug::{TelemetrySequencer, UartTx};
use crate::{ByteQueue, Debouncer, FrameDecoder, FrameError, HostReadArbiter};

/// Input samples applied on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TickInputs {
    /// Raw PS/2 clock line level.
    pub ps2_clock_raw: bool,
    /// Raw PS/2 data line level.
    pub ps2_data_raw: bool,
    /// Host request to clear the sticky interrupt latch.
    pub interrupt_clear: bool,
    /// Host read-request (chip-select) line.
    pub host_read_request: bool,
    /// Global reset; overrides every other input on this tick.
    pub reset: bool,
}

impl Default for TickInputs {
    /// Idle bus: both PS/2 lines released high, host lines low.
    fn default() -> Self {
        Self {
            ps2_clock_raw: true,
            ps2_data_raw: true,
            interrupt_clear: false,
            host_read_request: false,
            reset: false,
        }
    }
}

/// Output signals after one tick has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TickOutputs {
    /// High for exactly one tick per accepted frame.
    pub decode_valid_pulse: bool,
    /// Sticky interrupt latch.
    pub interrupt_flag: bool,
    /// Byte queue holds at least one byte.
    pub queue_has_data: bool,
    /// Byte queue is at capacity.
    pub queue_full: bool,
    /// Registered output of the last successful dequeue.
    pub host_data_bus: u8,
    /// Host read request was sampled high; the data bus is driven while set.
    pub host_bus_enabled: bool,
    /// Debug serial line level.
    pub debug_tx_line: bool,
    /// Debug transmitter has a byte in flight.
    pub debug_tx_busy: bool,
    /// Number of ticks committed since the core was constructed.
    pub tick: u64,
}

/// Complete register state of every component, committed once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Debouncer on the PS/2 clock line.
    pub clock_line: Debouncer,
    /// Debouncer on the PS/2 data line.
    pub data_line: Debouncer,
    /// Frame decoder registers.
    pub decoder: FrameDecoder,
    /// Byte queue and its output register.
    pub queue: ByteQueue,
    /// Sticky interrupt latch.
    pub interrupt: bool,
    /// Host read-request glitch filter.
    pub host_read: HostReadArbiter,
    /// Telemetry sequencer registers.
    pub telemetry: TelemetrySequencer,
    /// Debug serial transmitter registers.
    pub uart: UartTx,
}

/// Deterministic trace events, reported in commit order within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Global reset forced every register to its initial value.
    Reset,
    /// A frame passed validation and its payload was pulsed out.
    FrameAccepted {
        /// Decoded payload.
        byte: u8,
    },
    /// A frame was dropped without a valid pulse.
    FrameDiscarded {
        /// Why the frame was dropped.
        reason: FrameError,
    },
    /// A decoded byte arrived while the queue was full and was dropped.
    QueueOverflow {
        /// The byte that was not stored.
        dropped: u8,
    },
    /// A read trigger found the queue empty.
    QueueUnderflow,
    /// A read trigger moved the head byte into the output register.
    HostRead {
        /// Byte now on the host data bus.
        byte: u8,
    },
    /// The host cleared a set interrupt latch.
    InterruptCleared,
    /// A decode arrived while telemetry was busy and will not be reported.
    TelemetrySkipped {
        /// The unreported byte.
        byte: u8,
    },
    /// The debug transmitter accepted a byte.
    DebugByteStarted {
        /// Byte being serialized.
        byte: u8,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event committed on tick `tick`.
    fn on_event(&mut self, tick: u64, event: TraceEvent);
}

/// Trace sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn on_event(&mut self, _tick: u64, _event: TraceEvent) {}
}

impl TraceSink for Vec<(u64, TraceEvent)> {
    fn on_event(&mut self, tick: u64, event: TraceEvent) {
        self.push((tick, event));
    }
}
