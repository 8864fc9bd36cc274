//! Pulse width classification and position mapping.
//!
//! A measured interval between two edges falls into one of three classes:
//!
//! - **Glitch**: shorter than the debounce threshold. The edge is treated
//!   as noise and the measurement is not consumed.
//! - **Valid**: strictly inside the valid window. The width is clamped to
//!   the clamp range and mapped linearly onto `-127..=127`.
//! - **Out of window**: any other width. The measurement is consumed but
//!   the channel keeps its previous position.

use crate::config::DecoderConfig;

/// Classification of one measured edge interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseClass {
    /// Below the debounce threshold
    Glitch,
    /// Inside the valid window, decoded to a position
    Valid(i8),
    /// Outside the valid window
    OutOfWindow,
}

/// Classifies an interval measured in microseconds.
///
/// # Examples
///
/// ```
/// use servo_decoder::config::DecoderConfig;
/// use servo_decoder::pulse::{classify, PulseClass};
///
/// let config = DecoderConfig::DEFAULT;
/// assert_eq!(classify(&config, 100), PulseClass::Glitch);
/// assert_eq!(classify(&config, 1_500), PulseClass::Valid(0));
/// assert_eq!(classify(&config, 3_000), PulseClass::OutOfWindow);
/// ```
pub fn classify(config: &DecoderConfig, width_us: u32) -> PulseClass {
    if width_us < config.debounce_us {
        PulseClass::Glitch
    } else if width_us > config.valid_min_us && width_us < config.valid_max_us {
        PulseClass::Valid(to_position(config, width_us))
    } else {
        PulseClass::OutOfWindow
    }
}

/// Maps a pulse width onto the signed position range.
///
/// The width is clamped first, then scaled by `config.scale` units per
/// millisecond around `config.center_us`. Fractions truncate toward zero,
/// so with the default timing 1.0 ms and 2.0 ms map to -127 and 127.
pub fn to_position(config: &DecoderConfig, width_us: u32) -> i8 {
    let clamped = width_us.clamp(config.clamp_min_us, config.clamp_max_us);
    let offset_us = clamped as i64 - config.center_us as i64;
    let scaled = offset_us * config.scale as i64 / 1_000;
    scaled.clamp(-(i8::MAX as i64), i8::MAX as i64) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: DecoderConfig = DecoderConfig::DEFAULT;

    #[test]
    fn test_classify_debounce_boundary() {
        assert_eq!(classify(&CONFIG, 0), PulseClass::Glitch);
        assert_eq!(classify(&CONFIG, 399), PulseClass::Glitch);
        assert_eq!(classify(&CONFIG, 400), PulseClass::OutOfWindow);
    }

    #[test]
    fn test_classify_window_is_exclusive() {
        assert_eq!(classify(&CONFIG, 800), PulseClass::OutOfWindow);
        assert_eq!(classify(&CONFIG, 801), PulseClass::Valid(-127));
        assert_eq!(classify(&CONFIG, 2_199), PulseClass::Valid(127));
        assert_eq!(classify(&CONFIG, 2_200), PulseClass::OutOfWindow);
        assert_eq!(classify(&CONFIG, 20_000), PulseClass::OutOfWindow);
    }

    #[test]
    fn test_position_endpoints_and_center() {
        assert_eq!(to_position(&CONFIG, 1_000), -127);
        assert_eq!(to_position(&CONFIG, 1_500), 0);
        assert_eq!(to_position(&CONFIG, 2_000), 127);
    }

    #[test]
    fn test_position_clamps() {
        assert_eq!(to_position(&CONFIG, 850), -127);
        assert_eq!(to_position(&CONFIG, 2_150), 127);
    }

    #[test]
    fn test_position_truncates_toward_zero() {
        // 0.1 ms * 255 = 25.5
        assert_eq!(to_position(&CONFIG, 1_600), 25);
        assert_eq!(to_position(&CONFIG, 1_400), -25);
    }

    #[test]
    fn test_position_is_exact_at_decimal_widths() {
        // -0.4 ms * 255 = -102 exactly, no float rounding
        assert_eq!(to_position(&CONFIG, 1_100), -102);
        assert_eq!(to_position(&CONFIG, 1_900), 102);
        assert_eq!(to_position(&CONFIG, 1_300), -51);
    }

    #[test]
    fn test_position_is_monotonic() {
        let mut previous = i8::MIN;
        for width in (1_000..=2_000).step_by(10) {
            let position = to_position(&CONFIG, width);
            assert!(position >= previous, "{width} us went backwards");
            previous = position;
        }
    }
}
