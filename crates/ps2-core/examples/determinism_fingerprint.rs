//! Deterministic output fingerprint for a fixed PS/2 session, used to compare
//! hosts and builds.

use proptest as _;
use ps2_core::{
    drive, CoreConfig, FrameShape, NoopTraceSink, Ps2Core, Ps2Timing, StimulusBuilder,
    TickOutputs, DEFAULT_FRAME_TIMEOUT_TICKS,
};
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const FRAME_GAP_TICKS: u32 = DEFAULT_FRAME_TIMEOUT_TICKS + 500;

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn hash_outputs(hash: &mut u64, out: &TickOutputs) {
    let flags = u8::from(out.decode_valid_pulse)
        | (u8::from(out.interrupt_flag) << 1)
        | (u8::from(out.queue_has_data) << 2)
        | (u8::from(out.queue_full) << 3)
        | (u8::from(out.host_bus_enabled) << 4)
        | (u8::from(out.debug_tx_line) << 5)
        | (u8::from(out.debug_tx_busy) << 6);
    hash_bytes(hash, &[flags, out.host_data_bus]);
}

fn session() -> StimulusBuilder {
    let mut builder = StimulusBuilder::new(Ps2Timing::default());
    builder.idle(1_000);
    builder.frame(0x1C, FrameShape::Valid).idle(FRAME_GAP_TICKS);
    builder.frame(0xF0, FrameShape::Valid).idle(FRAME_GAP_TICKS);
    builder.frame(0x1C, FrameShape::BadParity).idle(FRAME_GAP_TICKS);
    builder.frame(0x32, FrameShape::Partial { payload_bits: 4 });
    builder.idle(FRAME_GAP_TICKS);
    builder.read_request(2).idle(4).read_request(50).idle(4);
    builder.clear_interrupt(1).idle(10);
    builder.read_request(2).idle(4);
    builder
}

fn fingerprint() -> String {
    let mut core = Ps2Core::new(CoreConfig::default()).expect("default config is valid");
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    let last = drive(&mut core, &session().build(), &mut NoopTraceSink, |out| {
        hash_outputs(&mut hash, out);
    });

    hash_bytes(&mut hash, &last.tick.to_le_bytes());
    let diag = core.diag();
    hash_bytes(&mut hash, &diag.frames_accepted.to_le_bytes());
    hash_bytes(&mut hash, &diag.total_discarded().to_le_bytes());
    hash_bytes(&mut hash, &diag.host_reads.to_le_bytes());
    hash_bytes(&mut hash, &diag.queue_underflows.to_le_bytes());

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
