//! Saturating diagnostic counters for the silent-drop paths.

use crate::FrameError;

/// Counters kept by the composer alongside the register state.
///
/// None of these influence the core's outputs. They exist so hosts and the
/// simulator can see how often each silent policy fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiagCounters {
    /// Frames that passed validation.
    pub frames_accepted: u32,
    /// Dropped frames, indexed by [`FrameError::index`].
    pub frames_discarded: [u32; FrameError::KINDS],
    /// Decoded bytes dropped because the queue was full.
    pub queue_overflows: u32,
    /// Read triggers against an empty queue.
    pub queue_underflows: u32,
    /// Successful host reads.
    pub host_reads: u32,
    /// Decodes not reported on the debug channel.
    pub telemetry_skipped: u32,
    /// Bytes accepted by the debug transmitter.
    pub debug_bytes_sent: u32,
}

impl DiagCounters {
    /// Records a frame verdict from the decoder.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_frame(&mut self, verdict: Result<u8, FrameError>) {
        match verdict {
            Ok(_) => self.frames_accepted = self.frames_accepted.saturating_add(1),
            Err(reason) => {
                let slot = &mut self.frames_discarded[reason.index()];
                *slot = slot.saturating_add(1);
            }
        }
    }

    /// Returns the number of frames dropped for `reason`'s kind.
    #[must_use]
    pub const fn discarded(&self, reason: FrameError) -> u32 {
        self.frames_discarded[reason.index()]
    }

    /// Returns the number of frames dropped for any reason.
    #[must_use]
    pub fn total_discarded(&self) -> u32 {
        self.frames_discarded
            .iter()
            .fold(0u32, |total, count| total.saturating_add(*count))
    }

    /// Resets all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
