//! Multi-channel servo pulse decoder.
//!
//! Reconstructs per-channel servo positions from edge interrupts on up to
//! `N` input lines and a free-running pulse timer.
//!
//! # Execution Contexts
//!
//! The decoder is shared between two contexts that never block:
//!
//! - **Tick context** calls [`ServoDecoder::on_tick`] at a fixed rate
//!   (1 kHz by default). It advances the resync gap counter and the
//!   staleness counter.
//! - **Edge context** calls [`ServoDecoder::on_edge`] once per rising or
//!   falling edge on any input line. It alone reads and clears the pulse
//!   timer, writes positions and moves the channel index.
//!
//! Every field is a single-word atomic accessed with relaxed ordering, so
//! the decoder lives in a plain `static` and both contexts use it through
//! `&self`. The gap counter is the only field with two writers (tick
//! increments, edge clears). Losing one increment to that race moves the
//! resync decision by at most one tick.
//!
//! # State Machine
//!
//! ```text
//!              gap >= resync_ticks (any state)
//!        ┌──────────────────────────────────────────┐
//!        v                                          │
//! Decoding{0} ──edge──> Decoding{1} ──edge──> ... Decoding{N-1} ──edge──> Syncing
//!                                                     (cycle complete)
//! ```
//!
//! Every edge is checked for the resync gap first. Edges that arrive in
//! `Syncing` are ignored until the next gap.

use portable_atomic::{AtomicBool, AtomicI8, AtomicU32, AtomicUsize, Ordering};

use crate::config::DecoderConfig;
use crate::pulse::{self, PulseClass};
use crate::timer::PulseTimer;

/// Position reported for unknown channels.
pub const NEUTRAL_POSITION: i8 = 0;

/// Explicit view of the decoder's channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// Cycle complete, waiting for the inter-cycle gap
    Syncing,
    /// Next measured pulse belongs to `channel`
    Decoding { channel: usize },
}

/// Result of feeding one edge to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// Gap since the last edge started a new cycle
    Resync,
    /// Edge came too soon after the previous one and was dropped
    Debounced,
    /// Pulse decoded and stored
    Accepted {
        channel: usize,
        position: i8,
        cycle_complete: bool,
    },
    /// Pulse outside the valid window, previous position held
    Rejected {
        channel: usize,
        width_us: u32,
        cycle_complete: bool,
    },
    /// Cycle already complete, edge ignored until the next gap
    Ignored,
}

impl EdgeOutcome {
    /// Returns `true` if this edge filled the last channel slot.
    pub fn completes_cycle(&self) -> bool {
        matches!(
            self,
            Self::Accepted {
                cycle_complete: true,
                ..
            } | Self::Rejected {
                cycle_complete: true,
                ..
            }
        )
    }
}

/// Input signal health derived from the staleness counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalStatus {
    /// No cycle completed since power-on or reset
    NeverReceived,
    /// Last cycle completed within the timeout
    Active,
    /// No complete cycle within the timeout
    Lost,
}

/// Diagnostic counters. All counters wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Completed cycles
    pub cycles: u32,
    /// Edges dropped by the debounce threshold
    pub debounced: u32,
    /// Pulses outside the valid window
    pub rejected: u32,
}

/// Servo pulse decoder for `N` channels.
///
/// # Examples
///
/// ```
/// use servo_decoder::config::{DecoderConfig, SERVO_NUM};
/// use servo_decoder::decoder::ServoDecoder;
///
/// static DECODER: ServoDecoder<SERVO_NUM> = ServoDecoder::new(DecoderConfig::DEFAULT);
///
/// // Tick context
/// DECODER.on_tick();
///
/// // Consumer
/// assert_eq!(DECODER.position(0), 0);
/// assert_eq!(DECODER.position(7), 0);
/// assert_eq!(DECODER.time_since_update(), 1);
/// ```
pub struct ServoDecoder<const N: usize> {
    config: DecoderConfig,
    positions: [AtomicI8; N],
    /// Channel slot for the next pulse, `N` while syncing
    index: AtomicUsize,
    /// Ticks since the last processed edge
    interrupt_time: AtomicU32,
    /// Ticks since the last completed cycle
    time_since_update: AtomicU32,
    received: AtomicBool,
    cycles: AtomicU32,
    debounced: AtomicU32,
    rejected: AtomicU32,
}

impl<const N: usize> ServoDecoder<N> {
    /// Creates a zeroed decoder.
    ///
    /// `const` so the decoder can live in a `static` shared with interrupt
    /// handlers.
    pub const fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            positions: [const { AtomicI8::new(NEUTRAL_POSITION) }; N],
            index: AtomicUsize::new(0),
            interrupt_time: AtomicU32::new(0),
            time_since_update: AtomicU32::new(0),
            received: AtomicBool::new(false),
            cycles: AtomicU32::new(0),
            debounced: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
        }
    }

    /// Returns all state to power-on values and restarts the pulse timer.
    ///
    /// Call before the edge interrupts are armed; it is not atomic with
    /// respect to a concurrent [`on_edge`](Self::on_edge).
    pub fn reset<T: PulseTimer>(&self, timer: &mut T) {
        for position in &self.positions {
            position.store(NEUTRAL_POSITION, Ordering::Relaxed);
        }
        self.index.store(0, Ordering::Relaxed);
        self.interrupt_time.store(0, Ordering::Relaxed);
        self.time_since_update.store(0, Ordering::Relaxed);
        self.received.store(false, Ordering::Relaxed);
        self.cycles.store(0, Ordering::Relaxed);
        self.debounced.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        timer.reset();
    }

    /// Periodic tick at the configured tick rate.
    ///
    /// Both counters saturate at `u32::MAX` during a prolonged signal loss.
    pub fn on_tick(&self) {
        saturating_increment(&self.interrupt_time);
        saturating_increment(&self.time_since_update);
    }

    /// Processes one rising or falling edge on any input line.
    ///
    /// `timer` must be the free-running counter that measures the interval
    /// since the previous edge; it is cleared whenever a measurement is
    /// consumed or a new cycle starts.
    pub fn on_edge<T: PulseTimer>(&self, timer: &mut T) -> EdgeOutcome {
        // Long gap: this edge starts a new cycle
        if self.interrupt_time.load(Ordering::Relaxed) >= self.config.resync_ticks {
            self.index.store(0, Ordering::Relaxed);
            self.interrupt_time.store(0, Ordering::Relaxed);
            timer.reset();

            #[cfg(feature = "debug-mode")]
            defmt::info!("servo: resync");

            return EdgeOutcome::Resync;
        }

        let index = self.index.load(Ordering::Relaxed);
        if index >= N {
            self.interrupt_time.store(0, Ordering::Relaxed);
            return EdgeOutcome::Ignored;
        }

        let width_us = self.config.counts_to_us(timer.count());
        let class = pulse::classify(&self.config, width_us);
        if class == PulseClass::Glitch {
            // Timer keeps counting from the last consumed edge
            self.debounced.fetch_add(1, Ordering::Relaxed);
            return EdgeOutcome::Debounced;
        }

        timer.reset();

        let next = index + 1;
        let cycle_complete = next == N;
        self.index.store(next, Ordering::Relaxed);

        let outcome = match class {
            PulseClass::Valid(position) => {
                self.positions[index].store(position, Ordering::Relaxed);
                EdgeOutcome::Accepted {
                    channel: index,
                    position,
                    cycle_complete,
                }
            }
            _ => {
                self.rejected.fetch_add(1, Ordering::Relaxed);

                #[cfg(feature = "debug-mode")]
                defmt::info!("servo: ch{} rejected {} us", index, width_us);

                EdgeOutcome::Rejected {
                    channel: index,
                    width_us,
                    cycle_complete,
                }
            }
        };

        if cycle_complete {
            self.time_since_update.store(0, Ordering::Relaxed);
            self.received.store(true, Ordering::Relaxed);
            self.cycles.fetch_add(1, Ordering::Relaxed);
        }

        self.interrupt_time.store(0, Ordering::Relaxed);
        outcome
    }

    /// Last valid position of `channel`, or [`NEUTRAL_POSITION`] for an
    /// unknown channel.
    pub fn position(&self, channel: usize) -> i8 {
        self.positions
            .get(channel)
            .map_or(NEUTRAL_POSITION, |position| position.load(Ordering::Relaxed))
    }

    /// Snapshot of all channel positions.
    ///
    /// Channels are read one by one, so a snapshot taken while a cycle is
    /// being decoded may mix two cycles.
    pub fn positions(&self) -> [i8; N] {
        core::array::from_fn(|channel| self.positions[channel].load(Ordering::Relaxed))
    }

    /// Ticks since the last completed cycle.
    pub fn time_since_update(&self) -> u32 {
        self.time_since_update.load(Ordering::Relaxed)
    }

    /// Current position in the channel sequence.
    pub fn state(&self) -> DecoderState {
        let index = self.index.load(Ordering::Relaxed);
        if index < N {
            DecoderState::Decoding { channel: index }
        } else {
            DecoderState::Syncing
        }
    }

    /// Classifies the input as lost once the staleness counter exceeds
    /// `timeout_ticks`.
    pub fn signal_status(&self, timeout_ticks: u32) -> SignalStatus {
        if !self.received.load(Ordering::Relaxed) {
            SignalStatus::NeverReceived
        } else if self.time_since_update() > timeout_ticks {
            SignalStatus::Lost
        } else {
            SignalStatus::Active
        }
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> DecoderStats {
        DecoderStats {
            cycles: self.cycles.load(Ordering::Relaxed),
            debounced: self.debounced.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

fn saturating_increment(counter: &AtomicU32) {
    // Err means the counter is already at u32::MAX
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |ticks| {
        ticks.checked_add(1)
    });
}
