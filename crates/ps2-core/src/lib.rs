//! Cycle-accurate PS/2 keyboard receiver core.
//!
//! Raw clock/data samples are debounced, decoded into validated bytes,
//! buffered in a four-entry queue and handed to a host through a
//! glitch-filtered read strobe. An optional serial channel reports a status
//! byte and the decoded byte for every frame.

/// Silent-discard classification and configuration errors.
pub mod error;
pub use error::{ConfigError, FrameError, QueueError};

/// Tick-rate constants and rate conversions.
pub mod timing;
pub use timing::{
    half_period_ticks, uart_divisor_for_baud, CORE_CLOCK_HZ, DEFAULT_DEBOUNCE_THRESHOLD,
    DEFAULT_FRAME_TIMEOUT_TICKS, DEFAULT_TELEMETRY_SETTLE_TICKS, DEFAULT_UART_DIVISOR,
    PS2_CLOCK_MAX_HZ, PS2_CLOCK_MIN_HZ,
};

/// Per-instance timing configuration.
pub mod config;
pub use config::CoreConfig;

/// Input synchronizer and stability filter.
pub mod debounce;
pub use debounce::Debouncer;

/// Frame decoder state machine.
pub mod decoder;
pub use decoder::{
    odd_parity_bit, validate_frame, DecodedByte, DecoderStep, FrameDecoder, FrameState,
    FRAME_BITS,
};

/// Decoded-byte FIFO.
pub mod queue;
pub use queue::{ByteQueue, QueueStep, BYTE_QUEUE_CAPACITY};

/// Host read-request glitch filter.
pub mod host_read;
pub use host_read::HostReadArbiter;

/// Debug serial transmitter and telemetry sequencer.
pub mod debug;

/// Per-tick signal contract and trace hooks.
pub mod api;
pub use api::{CoreState, NoopTraceSink, TickInputs, TickOutputs, TraceEvent, TraceSink};

/// Diagnostic counters.
pub mod diag;
pub use diag::DiagCounters;

/// Tick composition of all components.
pub mod composer;
pub use composer::Ps2Core;

/// Waveform generation and serial line monitoring for simulations.
pub mod stimulus;
pub use stimulus::{drive, FrameShape, Ps2Timing, SerialMonitor, StimulusBuilder};

#[cfg(test)]
use proptest as _;
