//! Two-stage synchronizer plus stability-window filter for one raw input line.

/// Registers of one debounced input line.
///
/// The raw sample passes through two single-tick latches before it is
/// compared with the previous synchronized sample. A run of `threshold`
/// unchanged comparisons commits the sample to the stable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Debouncer {
    sync_first: bool,
    sync_second: bool,
    sample: bool,
    counter: u16,
    stable: bool,
}

impl Debouncer {
    /// Ticks from the first raw sample at a new level until [`Self::output`]
    /// reports it, for a line that holds the level throughout.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn settle_latency(threshold: u16) -> u32 {
        threshold as u32 + 3
    }

    /// Returns the committed, filtered line level.
    #[must_use]
    pub const fn output(&self) -> bool {
        self.stable
    }

    /// Returns the current stability counter value.
    #[must_use]
    pub const fn counter(&self) -> u16 {
        self.counter
    }

    /// Computes the registers after one tick with `raw` sampled on the pin.
    #[must_use]
    pub const fn next(&self, raw: bool, threshold: u16) -> Self {
        let mut next = *self;
        next.sync_first = raw;
        next.sync_second = self.sync_first;

        if self.sync_second == self.sample {
            let counter = if self.counter < threshold {
                self.counter + 1
            } else {
                threshold
            };
            next.counter = counter;
            if counter >= threshold {
                next.stable = self.sample;
            }
        } else {
            next.sample = self.sync_second;
            next.counter = 0;
        }

        next
    }
}
