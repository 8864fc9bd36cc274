//! Decoder error types.
//!
//! Decoding itself never fails: bad pulses are dropped and surface only
//! through the staleness counter. The only fallible step is checking a
//! [`DecoderConfig`](crate::config::DecoderConfig).

use core::fmt;

/// Inconsistent decoder timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pulse timer frequency is zero
    ZeroTimerFrequency,
    /// Resync threshold of zero ticks would resync on every edge
    ZeroResyncThreshold,
    /// Valid pulse window has no width
    EmptyWindow,
    /// Debounce threshold reaches into the valid pulse window
    DebounceAboveWindow,
    /// Clamp range is inverted or extends past the valid window
    ClampOutsideWindow,
    /// Center pulse width lies outside the clamp range
    CenterOutsideClamp,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTimerFrequency => write!(f, "pulse timer frequency must be non-zero"),
            Self::ZeroResyncThreshold => write!(f, "resync threshold must be at least one tick"),
            Self::EmptyWindow => write!(f, "valid pulse window is empty"),
            Self::DebounceAboveWindow => {
                write!(f, "debounce threshold must be below the valid pulse window")
            }
            Self::ClampOutsideWindow => write!(f, "clamp range must lie inside the valid window"),
            Self::CenterOutsideClamp => write!(f, "center pulse must lie inside the clamp range"),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ConfigError::EmptyWindow.to_string(),
            "valid pulse window is empty"
        );
        assert_eq!(
            ConfigError::ZeroTimerFrequency.to_string(),
            "pulse timer frequency must be non-zero"
        );
    }
}
