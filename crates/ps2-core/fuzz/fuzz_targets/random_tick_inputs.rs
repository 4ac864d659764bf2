#![no_main]

use libfuzzer_sys::fuzz_target;
use ps2_core::{validate_frame, CoreConfig, Ps2Core, TickInputs, BYTE_QUEUE_CAPACITY};

const FUZZ_CONFIG: CoreConfig = CoreConfig {
    debounce_threshold: 2,
    frame_timeout_ticks: 16,
    uart_divisor: 2,
    telemetry_settle_ticks: 1,
    telemetry_enabled: true,
};

fuzz_target!(|data: &[u8]| {
    if let [lo, hi, ..] = data {
        let _ = validate_frame(u16::from_le_bytes([*lo, *hi]));
    }

    let Ok(mut core) = Ps2Core::new(FUZZ_CONFIG) else {
        return;
    };
    let mut prev_pulse = false;
    for byte in data {
        let outputs = core.tick(TickInputs {
            ps2_clock_raw: byte & 0x01 != 0,
            ps2_data_raw: byte & 0x02 != 0,
            interrupt_clear: byte & 0x0C == 0x0C,
            host_read_request: byte & 0x10 != 0,
            reset: byte == 0xFF,
        });
        assert!(core.state().queue.len() <= BYTE_QUEUE_CAPACITY);
        assert!(!outputs.queue_full || outputs.queue_has_data);
        assert!(!(prev_pulse && outputs.decode_valid_pulse));
        prev_pulse = outputs.decode_valid_pulse;
    }
});
