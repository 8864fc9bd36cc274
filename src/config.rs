//! Decoder timing configuration.
//!
//! All timing is expressed in two units:
//!
//! - **Pulse timer counts**, converted to microseconds using
//!   [`DecoderConfig::timer_freq_hz`]. Pulse widths and the debounce
//!   threshold are compared in microseconds.
//! - **Ticks** of the periodic housekeeping callback running at
//!   [`TICK_HZ`]. The resync gap and the staleness counter are counted in
//!   ticks (1 tick = 1 ms at the default rate).
//!
//! # Servo Signal Timing
//!
//! ```text
//!  gap >= 4 ms        1.0..2.0 ms      1.0..2.0 ms      1.0..2.0 ms
//! ____________|‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_______________________________________  CH0
//! ___________________________|‾‾‾‾‾‾‾‾‾‾‾‾‾|_________________________  CH1
//! _________________________________________|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|________  CH2
//! ```
//!
//! The receiver emits the channel pulses back to back, so the falling edge
//! of one channel and the rising edge of the next arrive within a few
//! microseconds of each other. The second of the two is dropped by the
//! debounce threshold.

use crate::error::ConfigError;

/// Number of servo input lines decoded per cycle.
pub const SERVO_NUM: usize = 3;

/// Pulse timer frequency (1 count = 1 µs).
pub const TIMER_FREQ_HZ: u32 = 1_000_000;

/// Rate of the periodic tick callback.
pub const TICK_HZ: u64 = 1_000;

/// Ticks without an edge that mark the boundary between two cycles.
pub const RESYNC_TICKS: u32 = 4;

/// Edges closer than this to the previous accepted edge are ignored.
pub const DEBOUNCE_US: u32 = 400;

/// Lower bound (exclusive) of a valid servo pulse.
pub const PULSE_VALID_MIN_US: u32 = 800;

/// Upper bound (exclusive) of a valid servo pulse.
pub const PULSE_VALID_MAX_US: u32 = 2_200;

/// Valid pulses shorter than this are clamped up to it.
pub const PULSE_CLAMP_MIN_US: u32 = 1_000;

/// Valid pulses longer than this are clamped down to it.
pub const PULSE_CLAMP_MAX_US: u32 = 2_000;

/// Pulse width decoded as position 0.
pub const PULSE_CENTER_US: u32 = 1_500;

/// Position units per millisecond of deviation from center.
pub const POSITION_SCALE: i32 = 255;

/// Staleness after which consumers treat the input as lost (ticks).
pub const SIGNAL_TIMEOUT_TICKS: u32 = 100;

/// Complete timing configuration of a [`ServoDecoder`](crate::decoder::ServoDecoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderConfig {
    /// Pulse timer frequency in Hz
    pub timer_freq_hz: u32,
    /// Tick count that triggers a resync
    pub resync_ticks: u32,
    /// Minimum spacing between edges (µs)
    pub debounce_us: u32,
    /// Exclusive lower bound of the valid window (µs)
    pub valid_min_us: u32,
    /// Exclusive upper bound of the valid window (µs)
    pub valid_max_us: u32,
    /// Clamp floor (µs)
    pub clamp_min_us: u32,
    /// Clamp ceiling (µs)
    pub clamp_max_us: u32,
    /// Neutral pulse width (µs)
    pub center_us: u32,
    /// Position units per millisecond
    pub scale: i32,
}

impl DecoderConfig {
    /// Standard hobby servo timing on a 1 MHz pulse timer.
    pub const DEFAULT: Self = Self {
        timer_freq_hz: TIMER_FREQ_HZ,
        resync_ticks: RESYNC_TICKS,
        debounce_us: DEBOUNCE_US,
        valid_min_us: PULSE_VALID_MIN_US,
        valid_max_us: PULSE_VALID_MAX_US,
        clamp_min_us: PULSE_CLAMP_MIN_US,
        clamp_max_us: PULSE_CLAMP_MAX_US,
        center_us: PULSE_CENTER_US,
        scale: POSITION_SCALE,
    };

    /// Checks that the timing values are consistent with each other.
    ///
    /// `const` so firmware can reject a bad configuration at compile time:
    ///
    /// ```
    /// use servo_decoder::config::DecoderConfig;
    ///
    /// const CONFIG: DecoderConfig = DecoderConfig::DEFAULT;
    /// const _: () = assert!(CONFIG.validate().is_ok());
    /// ```
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.timer_freq_hz == 0 {
            return Err(ConfigError::ZeroTimerFrequency);
        }
        if self.resync_ticks == 0 {
            return Err(ConfigError::ZeroResyncThreshold);
        }
        if self.valid_min_us >= self.valid_max_us {
            return Err(ConfigError::EmptyWindow);
        }
        if self.debounce_us >= self.valid_min_us {
            return Err(ConfigError::DebounceAboveWindow);
        }
        if self.clamp_min_us > self.clamp_max_us
            || self.clamp_min_us < self.valid_min_us
            || self.clamp_max_us > self.valid_max_us
        {
            return Err(ConfigError::ClampOutsideWindow);
        }
        if self.center_us < self.clamp_min_us || self.center_us > self.clamp_max_us {
            return Err(ConfigError::CenterOutsideClamp);
        }
        Ok(())
    }

    /// Converts a pulse timer count to microseconds, saturating at `u32::MAX`.
    pub const fn counts_to_us(&self, counts: u32) -> u32 {
        let us = counts as u64 * 1_000_000 / self.timer_freq_hz as u64;
        if us > u32::MAX as u64 {
            u32::MAX
        } else {
            us as u32
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
