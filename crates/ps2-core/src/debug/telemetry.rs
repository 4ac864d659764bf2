//! Best-effort telemetry: for every decoded byte, send a status byte and then
//! the byte itself through the serial transmitter.
//!
//! Decodes that arrive while a previous pair is still in flight are not
//! queued. The primary decode path never waits on this channel.

/// Status bit set in every telemetry status byte.
pub const STATUS_FRAME_VALID: u8 = 1 << 0;
/// Status bit mirroring the sticky interrupt latch.
pub const STATUS_INTERRUPT: u8 = 1 << 1;
/// Status bit set while the byte queue holds data.
pub const STATUS_QUEUE_HAS_DATA: u8 = 1 << 2;
/// Status bit set while the byte queue is full.
pub const STATUS_QUEUE_FULL: u8 = 1 << 3;

/// Host-visible flags sampled into the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusFlags {
    /// Sticky interrupt latch.
    pub interrupt: bool,
    /// Queue is not empty.
    pub queue_has_data: bool,
    /// Queue is full.
    pub queue_full: bool,
}

impl StatusFlags {
    /// Packs the flags into the telemetry status byte layout.
    #[must_use]
    pub const fn status_byte(self) -> u8 {
        let mut status = STATUS_FRAME_VALID;
        if self.interrupt {
            status |= STATUS_INTERRUPT;
        }
        if self.queue_has_data {
            status |= STATUS_QUEUE_HAS_DATA;
        }
        if self.queue_full {
            status |= STATUS_QUEUE_FULL;
        }
        status
    }
}

/// Which of the two telemetry bytes is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TelemetryPhase {
    /// The status byte, sent first.
    Status,
    /// The decoded data byte, sent second.
    Data,
}

/// Sequencer state machine tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TelemetryState {
    /// Waiting for a decode.
    #[default]
    Idle,
    /// Waiting for post-decode flags to settle.
    Settle {
        /// Ticks left before the status byte is sampled.
        remaining: u8,
    },
    /// Holding a transmit request until the transmitter reports busy.
    Send(TelemetryPhase),
    /// Waiting for the transmitter to finish the current byte.
    Drain(TelemetryPhase),
}

/// Result of one sequencer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryStep {
    /// Registers to commit at the end of the tick.
    pub next: TelemetrySequencer,
    /// Decoded byte that arrived while busy and was not reported.
    pub skipped: Option<u8>,
}

/// Registers of the telemetry sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TelemetrySequencer {
    state: TelemetryState,
    status: u8,
    data: u8,
    request: Option<u8>,
}

impl TelemetrySequencer {
    /// Returns the current state machine tag.
    #[must_use]
    pub const fn state(&self) -> TelemetryState {
        self.state
    }

    /// Returns the byte offered to the transmitter this tick, if any.
    #[must_use]
    pub const fn request(&self) -> Option<u8> {
        self.request
    }

    /// Returns the captured data byte of the pair in flight.
    #[must_use]
    pub const fn captured_data(&self) -> u8 {
        self.data
    }

    /// Computes the registers after one tick.
    ///
    /// `decoded` is the decoder's valid pulse, `flags` the current host-visible
    /// flags, and `tx_busy` the transmitter's busy output.
    #[must_use]
    pub const fn step(
        &self,
        decoded: Option<u8>,
        flags: StatusFlags,
        tx_busy: bool,
        settle_ticks: u8,
    ) -> TelemetryStep {
        let mut next = *self;
        let mut skipped = None;

        match self.state {
            TelemetryState::Idle => {
                if let Some(byte) = decoded {
                    next.data = byte;
                    next.state = TelemetryState::Settle {
                        remaining: settle_ticks,
                    };
                }
            }
            TelemetryState::Settle { remaining } => {
                skipped = decoded;
                if remaining > 1 {
                    next.state = TelemetryState::Settle {
                        remaining: remaining - 1,
                    };
                } else {
                    next.status = flags.status_byte();
                    next.request = Some(next.status);
                    next.state = TelemetryState::Send(TelemetryPhase::Status);
                }
            }
            TelemetryState::Send(phase) => {
                skipped = decoded;
                if tx_busy {
                    next.request = None;
                    next.state = TelemetryState::Drain(phase);
                }
            }
            TelemetryState::Drain(phase) => {
                skipped = decoded;
                if !tx_busy {
                    next.state = match phase {
                        TelemetryPhase::Status => {
                            next.request = Some(self.data);
                            TelemetryState::Send(TelemetryPhase::Data)
                        }
                        TelemetryPhase::Data => TelemetryState::Idle,
                    };
                }
            }
        }

        TelemetryStep { next, skipped }
    }
}
