//! Executes parsed scripts against a receiver core and renders a transcript.

use std::fs;
use std::path::Path;

use ps2_core::{
    drive, CoreConfig, Debouncer, DiagCounters, Ps2Core, Ps2Timing, SerialMonitor,
    StimulusBuilder, TraceEvent,
};
use tracing::{debug, info, warn};

use crate::errors::SimError;
use crate::script::{parse_script, Command, ScriptLine};

/// Ticks after a read strobe for the registered dequeue to reach the bus.
const READ_SETTLE_TICKS: u32 = 2;
/// Extra idle after the end-of-frame timeout before the next command.
const FRAME_MARGIN_TICKS: u32 = 64;

/// Outcome of one script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimReport {
    /// Transcript lines in tick order, followed by the summary.
    pub lines: Vec<String>,
    /// Bytes recovered from the debug serial line.
    pub debug_bytes: Vec<u8>,
    /// Number of `expect` commands that did not match.
    pub expect_failures: usize,
    /// Diagnostic counters at the end of the run.
    pub diag: DiagCounters,
    /// Ticks simulated.
    pub ticks: u64,
}

impl SimReport {
    /// Returns true when every `expect` matched.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.expect_failures == 0
    }
}

/// Drives a [`Ps2Core`] one script command at a time.
#[derive(Debug)]
pub struct Simulator {
    core: Ps2Core,
    timing: Ps2Timing,
    monitor: SerialMonitor,
    last_read: Option<u8>,
    lines: Vec<String>,
    debug_bytes: Vec<u8>,
    expect_failures: usize,
}

impl Simulator {
    /// Creates a simulator and releases the bus until both debounced lines
    /// read high.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] when the core rejects `config`.
    pub fn new(config: CoreConfig) -> Result<Self, SimError> {
        let core = Ps2Core::new(config)?;
        let mut simulator = Self {
            core,
            timing: Ps2Timing::default(),
            monitor: SerialMonitor::new(config.uart_divisor),
            last_read: None,
            lines: Vec::new(),
            debug_bytes: Vec::new(),
            expect_failures: 0,
        };
        let mut builder = StimulusBuilder::new(simulator.timing);
        builder.idle(simulator.power_up_ticks());
        simulator.apply(&builder);
        Ok(simulator)
    }

    fn power_up_ticks(&self) -> u32 {
        Debouncer::settle_latency(self.core.config().debounce_threshold)
            .saturating_add(FRAME_MARGIN_TICKS)
    }

    fn frame_gap_ticks(&self) -> u32 {
        self.core
            .config()
            .frame_timeout_ticks
            .saturating_add(self.power_up_ticks())
    }

    /// Executes one script line.
    pub fn execute(&mut self, line: &ScriptLine) {
        debug!(line = line.number, command = ?line.command, "executing script line");
        let mut builder = StimulusBuilder::new(self.timing);

        match line.command {
            Command::Idle { ticks } => {
                builder.idle(ticks);
            }
            Command::Rate { timing } => {
                self.timing = timing;
                return;
            }
            Command::Send { byte, shape } => {
                builder.frame(byte, shape).idle(self.frame_gap_ticks());
            }
            Command::Read { ticks } => {
                self.last_read = None;
                builder.read_request(ticks).idle(READ_SETTLE_TICKS);
            }
            Command::Clear => {
                builder.clear_interrupt(1);
            }
            Command::Reset => {
                builder.reset(1, true).idle(self.power_up_ticks());
            }
            Command::Expect { byte } => {
                self.check_expect(line.number, byte);
                return;
            }
        }

        self.apply(&builder);
    }

    fn check_expect(&mut self, number: usize, expected: u8) {
        if self.last_read == Some(expected) {
            self.lines
                .push(format!("line {number}: expect {expected:#04x} ok"));
            return;
        }
        let got = self
            .last_read
            .map_or_else(|| "nothing".to_string(), |byte| format!("{byte:#04x}"));
        warn!(line = number, expected, last_read = ?self.last_read, "expectation failed");
        self.lines.push(format!(
            "line {number}: expect {expected:#04x} FAILED, read returned {got}"
        ));
        self.expect_failures += 1;
    }

    fn apply(&mut self, builder: &StimulusBuilder) {
        let mut events: Vec<(u64, TraceEvent)> = Vec::new();
        let mut received: Vec<(u64, u8)> = Vec::new();
        let monitor = &mut self.monitor;
        drive(&mut self.core, &builder.build(), &mut events, |out| {
            if let Some(byte) = monitor.sample(out.debug_tx_line) {
                received.push((out.tick, byte));
            }
        });

        let mut received = received.into_iter().peekable();
        for (tick, event) in events {
            while let Some((rx_tick, byte)) = received.next_if(|(rx_tick, _)| *rx_tick < tick) {
                self.record_debug_byte(rx_tick, byte);
            }
            match event {
                TraceEvent::HostRead { byte } => self.last_read = Some(byte),
                TraceEvent::Reset => self.last_read = None,
                _ => {}
            }
            self.lines.push(format!("tick {tick}: {}", describe(event)));
        }
        for (rx_tick, byte) in received {
            self.record_debug_byte(rx_tick, byte);
        }
    }

    fn record_debug_byte(&mut self, tick: u64, byte: u8) {
        self.debug_bytes.push(byte);
        self.lines.push(format!("tick {tick}: debug rx {byte:#04x}"));
    }

    /// Finishes the run and appends the summary line.
    #[must_use]
    pub fn finish(mut self) -> SimReport {
        let diag = *self.core.diag();
        let ticks = self.core.outputs().tick;
        self.lines.push(format!(
            "summary: ticks={ticks} accepted={} discarded={} overflows={} underflows={} \
             host_reads={} telemetry_skipped={} debug_bytes={} framing_errors={} \
             expect_failures={}",
            diag.frames_accepted,
            diag.total_discarded(),
            diag.queue_overflows,
            diag.queue_underflows,
            diag.host_reads,
            diag.telemetry_skipped,
            self.debug_bytes.len(),
            self.monitor.framing_errors(),
            self.expect_failures,
        ));
        info!(ticks, failures = self.expect_failures, "script finished");

        SimReport {
            lines: self.lines,
            debug_bytes: self.debug_bytes,
            expect_failures: self.expect_failures,
            diag,
            ticks,
        }
    }
}

fn describe(event: TraceEvent) -> String {
    match event {
        TraceEvent::Reset => "reset".to_string(),
        TraceEvent::FrameAccepted { byte } => format!("frame accepted {byte:#04x}"),
        TraceEvent::FrameDiscarded { reason } => format!("frame discarded: {reason}"),
        TraceEvent::QueueOverflow { dropped } => {
            format!("queue full, dropped {dropped:#04x}")
        }
        TraceEvent::QueueUnderflow => "read of empty queue".to_string(),
        TraceEvent::HostRead { byte } => format!("host read {byte:#04x}"),
        TraceEvent::InterruptCleared => "interrupt cleared".to_string(),
        TraceEvent::TelemetrySkipped { byte } => format!("telemetry skipped {byte:#04x}"),
        TraceEvent::DebugByteStarted { byte } => format!("debug tx {byte:#04x}"),
    }
}

/// Runs already-parsed script lines on a fresh core.
///
/// # Errors
///
/// Returns [`SimError::Config`] when the core rejects `config`.
pub fn run_script(lines: &[ScriptLine], config: CoreConfig) -> Result<SimReport, SimError> {
    let mut simulator = Simulator::new(config)?;
    for line in lines {
        simulator.execute(line);
    }
    Ok(simulator.finish())
}

/// Loads and validates a JSON core configuration.
///
/// Missing fields take their default values.
///
/// # Errors
///
/// Returns [`SimError::Io`], [`SimError::ConfigJson`] or [`SimError::Config`].
pub fn load_config(path: &Path) -> Result<CoreConfig, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: CoreConfig =
        serde_json::from_str(&text).map_err(|source| SimError::ConfigJson {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and runs a script file.
///
/// # Errors
///
/// Returns [`SimError::Io`] or [`SimError::Script`] for an unusable script
/// and [`SimError::Config`] for a rejected configuration.
pub fn run_script_file(path: &Path, config: CoreConfig) -> Result<SimReport, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let lines = parse_script(&text).map_err(|error| SimError::Script {
        path: path.to_path_buf(),
        error,
    })?;
    info!(script = %path.display(), commands = lines.len(), "running script");
    run_script(&lines, config)
}
