//! Immutable per-instance configuration of the receiver core.

use crate::timing::{
    DEFAULT_DEBOUNCE_THRESHOLD, DEFAULT_FRAME_TIMEOUT_TICKS, DEFAULT_TELEMETRY_SETTLE_TICKS,
    DEFAULT_UART_DIVISOR,
};
use crate::ConfigError;

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreConfig {
    /// Ticks a synchronized line must hold steady before the debouncer commits it.
    pub debounce_threshold: u16,
    /// Ticks of sustained clock-high that end a frame in progress.
    pub frame_timeout_ticks: u32,
    /// Debug serial bit period in ticks.
    pub uart_divisor: u16,
    /// Ticks between a decode and the telemetry status sample.
    pub telemetry_settle_ticks: u8,
    /// Enables the debug telemetry channel.
    pub telemetry_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            debounce_threshold: DEFAULT_DEBOUNCE_THRESHOLD,
            frame_timeout_ticks: DEFAULT_FRAME_TIMEOUT_TICKS,
            uart_divisor: DEFAULT_UART_DIVISOR,
            telemetry_settle_ticks: DEFAULT_TELEMETRY_SETTLE_TICKS,
            telemetry_enabled: true,
        }
    }
}

impl CoreConfig {
    /// Checks every timing field for values the core cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] for the first zero-valued timing field.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_threshold == 0 {
            return Err(ConfigError::ZeroDebounceThreshold);
        }
        if self.frame_timeout_ticks == 0 {
            return Err(ConfigError::ZeroFrameTimeout);
        }
        if self.uart_divisor == 0 {
            return Err(ConfigError::ZeroUartDivisor);
        }
        if self.telemetry_settle_ticks == 0 {
            return Err(ConfigError::ZeroSettleDelay);
        }
        Ok(())
    }
}
