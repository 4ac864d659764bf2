//! Script-driven simulator for the PS/2 receiver core.
//!
//! A script describes device frames, host read strobes, interrupt clears and
//! resets. The runner turns each command into per-tick inputs, drives a
//! [`ps2_core::Ps2Core`] and records trace events, bytes seen on the debug
//! serial line and the outcome of every `expect`.

use tracing_subscriber as _;

/// Script and run error types.
pub mod errors;
/// Script execution and transcript rendering.
pub mod runner;
/// Script language parser.
pub mod script;

pub use errors::{ScriptError, ScriptErrorKind, SimError};
pub use runner::{load_config, run_script, run_script_file, SimReport, Simulator};
pub use script::{parse_script, Command, ScriptLine};
