//! Glitch filter for the host read-request (chip-select) line.
//!
//! A rising edge arms the filter. If the line is still high on the following
//! tick, one dequeue trigger is issued and the filter disarms until the line
//! is released and asserted again.

/// Registers of the host read arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HostReadArbiter {
    prev_request: bool,
    armed: bool,
    trigger: bool,
}

impl HostReadArbiter {
    /// Returns true for the single tick a qualifying request issues a dequeue.
    #[must_use]
    pub const fn trigger(&self) -> bool {
        self.trigger
    }

    /// Returns true while a rising edge waits for its confirming tick.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns the request level sampled on the last tick.
    #[must_use]
    pub const fn request_sampled(&self) -> bool {
        self.prev_request
    }

    /// Computes the registers after one tick with `request` sampled.
    #[must_use]
    pub const fn next(&self, request: bool) -> Self {
        let (armed, trigger) = match (request, self.prev_request, self.armed) {
            (false, _, _) => (false, false),
            (true, false, _) => (true, false),
            (true, true, true) => (false, true),
            (true, true, false) => (false, false),
        };
        Self {
            prev_request: request,
            armed,
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HostReadArbiter;

    fn triggers(levels: impl IntoIterator<Item = bool>) -> usize {
        let mut arbiter = HostReadArbiter::default();
        let mut count = 0;
        for level in levels {
            arbiter = arbiter.next(level);
            if arbiter.trigger() {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn single_tick_request_never_triggers() {
        assert_eq!(triggers([false, true, false, false]), 0);
    }

    #[test]
    fn two_tick_request_triggers_once() {
        assert_eq!(triggers([false, true, true, false]), 1);
    }

    #[test]
    fn long_request_triggers_once() {
        let levels = std::iter::once(false)
            .chain(std::iter::repeat_n(true, 100))
            .chain(std::iter::once(false));
        assert_eq!(triggers(levels), 1);
    }

    #[test]
    fn release_and_reassert_triggers_again() {
        assert_eq!(triggers([true, true, false, true, true, true]), 2);
    }

    #[test]
    fn trigger_is_one_tick_wide_and_disarms() {
        let mut arbiter = HostReadArbiter::default();
        arbiter = arbiter.next(true);
        assert!(arbiter.is_armed());
        assert!(!arbiter.trigger());

        arbiter = arbiter.next(true);
        assert!(arbiter.trigger());
        assert!(!arbiter.is_armed());

        arbiter = arbiter.next(true);
        assert!(!arbiter.trigger());
    }

    #[test]
    fn drop_while_armed_clears_arming() {
        let mut arbiter = HostReadArbiter::default().next(true);
        arbiter = arbiter.next(false);
        assert!(!arbiter.is_armed());
        assert!(!arbiter.request_sampled());
    }
}
