//! Tick-rate constants and conversions between wall-clock rates and ticks.

/// Core tick frequency the default constants are derived for (25 MHz).
pub const CORE_CLOCK_HZ: u32 = 25_000_000;

/// Ticks a synchronized input must hold steady before the debouncer accepts it.
pub const DEFAULT_DEBOUNCE_THRESHOLD: u16 = 128;

/// Ticks of sustained clock-high that terminate a frame.
pub const DEFAULT_FRAME_TIMEOUT_TICKS: u32 = 2500;

/// Debug serial bit period in ticks (115 200 baud at [`CORE_CLOCK_HZ`]).
pub const DEFAULT_UART_DIVISOR: u16 = 217;

/// Ticks the telemetry sequencer waits after a decode before sampling status.
pub const DEFAULT_TELEMETRY_SETTLE_TICKS: u8 = 2;

/// Slowest supported PS/2 device clock.
pub const PS2_CLOCK_MIN_HZ: u32 = 10_000;

/// Fastest supported PS/2 device clock.
pub const PS2_CLOCK_MAX_HZ: u32 = 16_700;

/// Ticks in one half period of a protocol clock running at `clock_hz`.
///
/// Returns `None` for a zero frequency or one faster than half the tick rate.
#[must_use]
pub const fn half_period_ticks(clock_hz: u32) -> Option<u32> {
    if clock_hz == 0 {
        return None;
    }
    let ticks = CORE_CLOCK_HZ / clock_hz.saturating_mul(2);
    if ticks == 0 {
        None
    } else {
        Some(ticks)
    }
}

/// Bit period in ticks for a serial line running at `baud`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn uart_divisor_for_baud(baud: u32) -> Option<u16> {
    if baud == 0 {
        return None;
    }
    let ticks = CORE_CLOCK_HZ / baud;
    if ticks == 0 || ticks > u16::MAX as u32 {
        None
    } else {
        Some(ticks as u16)
    }
}
