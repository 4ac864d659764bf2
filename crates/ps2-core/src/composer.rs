//! Per-tick composition of every component with simultaneous commit.
//!
//! Each tick computes every component's next registers from a frozen copy of
//! the current [`CoreState`] and the tick's inputs, then replaces the whole
//! state at once. No component sees another's updated registers within the
//! same tick.

use tracing::{debug, trace};

use crate::api::NoopTraceSink;
use crate::debug::StatusFlags;
use crate::{
    ConfigError, CoreConfig, CoreState, DiagCounters, QueueError, TickInputs, TickOutputs,
    TraceEvent, TraceSink,
};

/// A receiver core instance: configuration, registers and counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ps2Core {
    config: CoreConfig,
    state: CoreState,
    diag: DiagCounters,
    elapsed: u64,
}

impl Ps2Core {
    /// Creates a core in its reset state.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`CoreConfig::validate`].
    pub fn new(config: CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Returns the configuration this core was built with.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Returns the committed register state.
    #[must_use]
    pub const fn state(&self) -> &CoreState {
        &self.state
    }

    /// Returns the diagnostic counters.
    #[must_use]
    pub const fn diag(&self) -> &DiagCounters {
        &self.diag
    }

    /// Returns the outputs of the last committed tick.
    #[must_use]
    pub const fn outputs(&self) -> TickOutputs {
        let state = &self.state;
        TickOutputs {
            decode_valid_pulse: state.decoder.output().valid,
            interrupt_flag: state.interrupt,
            queue_has_data: !state.queue.is_empty(),
            queue_full: state.queue.is_full(),
            host_data_bus: state.queue.output(),
            host_bus_enabled: state.host_read.request_sampled(),
            debug_tx_line: state.uart.line(),
            debug_tx_busy: state.uart.busy(),
            tick: self.elapsed,
        }
    }

    /// Advances one tick without tracing.
    pub fn tick(&mut self, inputs: TickInputs) -> TickOutputs {
        self.tick_traced(inputs, &mut NoopTraceSink)
    }

    /// Advances one tick, reporting committed events to `sink`.
    #[allow(clippy::too_many_lines)]
    pub fn tick_traced<S: TraceSink + ?Sized>(
        &mut self,
        inputs: TickInputs,
        sink: &mut S,
    ) -> TickOutputs {
        self.elapsed = self.elapsed.wrapping_add(1);
        let tick = self.elapsed;

        if inputs.reset {
            self.state = CoreState::default();
            self.diag.reset();
            emit(sink, tick, TraceEvent::Reset);
            return self.outputs();
        }

        let config = self.config;
        let current = self.state;

        let clock_line = current
            .clock_line
            .next(inputs.ps2_clock_raw, config.debounce_threshold);
        let data_line = current
            .data_line
            .next(inputs.ps2_data_raw, config.debounce_threshold);

        let decoder = current.decoder.step(
            current.clock_line.output(),
            current.data_line.output(),
            config.frame_timeout_ticks,
        );

        let host_read = current.host_read.next(inputs.host_read_request);
        let queue = current
            .queue
            .step(current.decoder.decoded(), current.host_read.trigger());

        let interrupt = if inputs.interrupt_clear {
            false
        } else {
            current.interrupt || current.decoder.output().valid
        };

        let flags = StatusFlags {
            interrupt: current.interrupt,
            queue_has_data: !current.queue.is_empty(),
            queue_full: current.queue.is_full(),
        };
        let telemetry_input = if config.telemetry_enabled {
            current.decoder.decoded()
        } else {
            None
        };
        let telemetry = current.telemetry.step(
            telemetry_input,
            flags,
            current.uart.busy(),
            config.telemetry_settle_ticks,
        );
        let uart = current
            .uart
            .next(current.telemetry.request(), config.uart_divisor);

        if let Some(verdict) = decoder.verdict {
            self.diag.record_frame(verdict);
            let event = match verdict {
                Ok(byte) => TraceEvent::FrameAccepted { byte },
                Err(reason) => TraceEvent::FrameDiscarded { reason },
            };
            emit(sink, tick, event);
        }
        if let Some(Err(QueueError::Overflow { dropped })) = queue.write {
            self.diag.queue_overflows = self.diag.queue_overflows.saturating_add(1);
            emit(sink, tick, TraceEvent::QueueOverflow { dropped });
        }
        match queue.read {
            Some(Ok(byte)) => {
                self.diag.host_reads = self.diag.host_reads.saturating_add(1);
                emit(sink, tick, TraceEvent::HostRead { byte });
            }
            Some(Err(_)) => {
                self.diag.queue_underflows = self.diag.queue_underflows.saturating_add(1);
                emit(sink, tick, TraceEvent::QueueUnderflow);
            }
            None => {}
        }
        if inputs.interrupt_clear && current.interrupt {
            emit(sink, tick, TraceEvent::InterruptCleared);
        }
        if let Some(byte) = telemetry.skipped {
            self.diag.telemetry_skipped = self.diag.telemetry_skipped.saturating_add(1);
            emit(sink, tick, TraceEvent::TelemetrySkipped { byte });
        }
        if let (false, true, Some(byte)) =
            (current.uart.busy(), uart.busy(), current.telemetry.request())
        {
            self.diag.debug_bytes_sent = self.diag.debug_bytes_sent.saturating_add(1);
            emit(sink, tick, TraceEvent::DebugByteStarted { byte });
        }

        self.state = CoreState {
            clock_line,
            data_line,
            decoder: decoder.next,
            queue: queue.next,
            interrupt,
            host_read,
            telemetry: telemetry.next,
            uart,
        };

        self.outputs()
    }

    /// Applies `inputs` for `ticks` consecutive ticks and returns the last
    /// outputs.
    pub fn run<S: TraceSink + ?Sized>(
        &mut self,
        inputs: TickInputs,
        ticks: u32,
        sink: &mut S,
    ) -> TickOutputs {
        let mut outputs = self.outputs();
        for _ in 0..ticks {
            outputs = self.tick_traced(inputs, sink);
        }
        outputs
    }
}

fn emit<S: TraceSink + ?Sized>(sink: &mut S, tick: u64, event: TraceEvent) {
    match event {
        TraceEvent::FrameAccepted { .. } | TraceEvent::HostRead { .. } | TraceEvent::Reset => {
            debug!(tick, ?event, "core event");
        }
        _ => trace!(tick, ?event, "core event"),
    }
    sink.on_event(tick, event);
}
