//! Pulse timer abstraction.
//!
//! The decoder measures the time between edges with a free-running
//! hardware counter that it reads and clears from the edge interrupt.
//! Firmware implements [`PulseTimer`] on top of a general-purpose timer
//! register; tests use [`MockCounter`].

/// Free-running counter advancing at
/// [`DecoderConfig::timer_freq_hz`](crate::config::DecoderConfig::timer_freq_hz).
///
/// Only the edge context reads or resets the counter.
pub trait PulseTimer {
    /// Current counter value.
    fn count(&self) -> u32;

    /// Restarts counting from zero.
    fn reset(&mut self);
}

/// Simulated counter driven by the test harness.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MockCounter {
    count: u32,
    resets: u32,
}

#[cfg(test)]
impl MockCounter {
    /// Create a counter at zero
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Let `counts` timer counts elapse
    pub(crate) fn advance(&mut self, counts: u32) {
        self.count = self.count.saturating_add(counts);
    }

    /// Number of times the decoder cleared the counter
    pub(crate) fn resets(&self) -> u32 {
        self.resets
    }
}

#[cfg(test)]
impl PulseTimer for MockCounter {
    fn count(&self) -> u32 {
        self.count
    }

    fn reset(&mut self) {
        self.count = 0;
        self.resets += 1;
    }
}
