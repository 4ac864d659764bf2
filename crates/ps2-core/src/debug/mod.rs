//! Debug telemetry channel: a generic serial transmitter and the sequencer
//! that streams a status byte and the decoded byte for each frame.

/// Status/data telemetry sequencer.
pub mod telemetry;
/// Generic 8N1 serial transmitter.
pub mod uart_tx;

pub use telemetry::{
    StatusFlags, TelemetryPhase, TelemetrySequencer, TelemetryState, TelemetryStep,
};
pub use uart_tx::{TxState, UartTx};
