//! Host-facing behavior: read strobes, queue policy and the interrupt latch.

use ps2_core::{
    drive, CoreConfig, DiagCounters, FrameShape, NoopTraceSink, Ps2Core, Ps2Timing,
    StimulusBuilder, TickInputs, TickOutputs, TraceEvent, BYTE_QUEUE_CAPACITY,
    DEFAULT_FRAME_TIMEOUT_TICKS,
};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const POWER_UP_TICKS: u32 = 1_000;
const FRAME_GAP_TICKS: u32 = DEFAULT_FRAME_TIMEOUT_TICKS + 500;

fn new_core() -> Ps2Core {
    Ps2Core::new(CoreConfig::default()).expect("default config is valid")
}

fn with_frames(payloads: &[u8]) -> StimulusBuilder {
    let mut builder = StimulusBuilder::new(Ps2Timing::default());
    builder.idle(POWER_UP_TICKS);
    for &payload in payloads {
        builder.frame(payload, FrameShape::Valid).idle(FRAME_GAP_TICKS);
    }
    builder
}

fn host_reads(events: &[(u64, TraceEvent)]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|(_, event)| match event {
            TraceEvent::HostRead { byte } => Some(*byte),
            _ => None,
        })
        .collect()
}

#[rstest]
#[case::glitch(1, 0)]
#[case::minimal(2, 1)]
#[case::held(100, 1)]
fn read_request_width_decides_dequeues(#[case] width: u32, #[case] expected: usize) {
    let mut builder = with_frames(&[0x41, 0x42]);
    builder.read_request(width).idle(10);

    let mut core = new_core();
    let mut events: Vec<(u64, TraceEvent)> = Vec::new();
    drive(&mut core, &builder.build(), &mut events, |_| {});

    assert_eq!(host_reads(&events).len(), expected);
    assert_eq!(core.state().queue.len(), 2 - expected);
}

#[test]
fn dequeued_byte_appears_on_the_bus_after_the_trigger() {
    let mut builder = with_frames(&[0x41]);
    builder.read_request(2).idle(2);

    let mut core = new_core();
    let mut outputs: Vec<TickOutputs> = Vec::new();
    drive(&mut core, &builder.build(), &mut NoopTraceSink, |out| {
        outputs.push(*out);
    });

    let len = outputs.len();
    let request_start = len - 4;
    assert!(outputs[request_start].host_bus_enabled);
    assert_eq!(outputs[request_start].host_data_bus, 0);
    assert_eq!(outputs[request_start + 1].host_data_bus, 0);
    assert_eq!(outputs[request_start + 2].host_data_bus, 0x41);
    assert!(!outputs[request_start + 2].queue_has_data);
    assert_eq!(outputs[len - 1].host_data_bus, 0x41);
}

#[test]
fn fifth_byte_is_dropped_and_order_kept() {
    let mut builder = with_frames(&[1, 2, 3, 4, 5]);
    for _ in 0..BYTE_QUEUE_CAPACITY {
        builder.read_request(3).idle(3);
    }

    let mut core = new_core();
    let mut events: Vec<(u64, TraceEvent)> = Vec::new();
    let mut outputs: Vec<TickOutputs> = Vec::new();
    drive(&mut core, &builder.build(), &mut events, |out| {
        outputs.push(*out);
    });

    let overflow_tick = events
        .iter()
        .find(|(_, event)| *event == TraceEvent::QueueOverflow { dropped: 5 })
        .map(|(tick, _)| *tick)
        .expect("fifth byte overflows the queue");
    let at_overflow = outputs
        .iter()
        .find(|out| out.tick == overflow_tick)
        .expect("outputs recorded for every tick");
    assert!(at_overflow.queue_full);
    assert!(at_overflow.queue_has_data);
    assert!(at_overflow.interrupt_flag);
    assert_eq!(host_reads(&events), vec![1, 2, 3, 4]);
    assert_eq!(core.diag().queue_overflows, 1);
    assert!(core.state().queue.is_empty());
}

#[test]
fn read_of_empty_queue_keeps_bus_value() {
    let mut builder = with_frames(&[0x7E]);
    builder.read_request(2).idle(2).read_request(2).idle(2);

    let mut core = new_core();
    let mut events: Vec<(u64, TraceEvent)> = Vec::new();
    let last = drive(&mut core, &builder.build(), &mut events, |_| {});

    assert_eq!(host_reads(&events), vec![0x7E]);
    assert_eq!(core.diag().queue_underflows, 1);
    assert_eq!(last.host_data_bus, 0x7E);
    assert!(!last.queue_has_data);
}

#[test]
fn interrupt_is_sticky_until_cleared() {
    let mut builder = with_frames(&[0x41]);
    builder.read_request(2).idle(FRAME_GAP_TICKS);

    let mut core = new_core();
    let mut sink: Vec<(u64, TraceEvent)> = Vec::new();
    let outputs = drive(&mut core, &builder.build(), &mut sink, |_| {});
    assert!(outputs.interrupt_flag);
    assert!(!outputs.queue_has_data);

    let outputs = core.tick_traced(
        TickInputs {
            interrupt_clear: true,
            ..TickInputs::default()
        },
        &mut sink,
    );
    assert!(!outputs.interrupt_flag);
    assert_eq!(
        sink.last().map(|(_, event)| *event),
        Some(TraceEvent::InterruptCleared)
    );

    let outputs = core.run(TickInputs::default(), 100, &mut sink);
    assert!(!outputs.interrupt_flag);
}

#[test]
fn clear_wins_over_a_simultaneous_valid_pulse() {
    let builder = with_frames(&[0x41]);
    let stimulus = builder.build();

    let mut core = new_core();
    let mut pulse_at = None;
    let mut index = 0;
    drive(&mut core, &stimulus, &mut NoopTraceSink, |out| {
        if out.decode_valid_pulse {
            pulse_at = Some(index);
        }
        index += 1;
    });
    let pulse_at = pulse_at.expect("frame is accepted");

    let mut replay = new_core();
    let mut cleared = stimulus;
    cleared[pulse_at + 1].interrupt_clear = true;
    let mut flag_after = None;
    let mut index = 0;
    drive(&mut replay, &cleared, &mut NoopTraceSink, |out| {
        if index == pulse_at + 1 {
            flag_after = Some(out.interrupt_flag);
        }
        index += 1;
    });

    assert_eq!(flag_after, Some(false));
    assert!(!replay.outputs().interrupt_flag);
    assert!(replay.outputs().queue_has_data);
}

#[test]
fn reset_clears_queue_latch_and_bus() {
    let mut builder = with_frames(&[0x41, 0x42]);
    builder.read_request(2).idle(2).reset(1, true);

    let mut core = new_core();
    let last = drive(&mut core, &builder.build(), &mut NoopTraceSink, |_| {});

    assert!(!last.interrupt_flag);
    assert!(!last.queue_has_data);
    assert_eq!(last.host_data_bus, 0);
    assert_eq!(*core.diag(), DiagCounters::default());
}
