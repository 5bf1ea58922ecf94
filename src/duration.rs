use std::time::Duration;

use tracing::debug;

use crate::error::WheelError;

/// Used when the input is missing, unparseable or zero
pub const DEFAULT_SPIN_SECS: f64 = 4.0;

/// Shortest spin we allow
pub const MIN_SPIN_SECS: f64 = 0.5;

/// Effective length of a spin animation. Always finite, at least
/// [`MIN_SPIN_SECS`] and representable as a [`Duration`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinDuration(f64);

impl SpinDuration {
    /// Coerce free-form user input. Never fails.
    pub fn parse(input: &str) -> Self {
        match Self::try_parse(input) {
            Ok(d) => d,
            Err(e) => {
                debug!(error = %e, "falling back to default spin duration");
                Self::default()
            }
        }
    }

    /// Reads the leading decimal number of `input` (trailing junk such as a
    /// unit suffix is ignored) and clamps it to the minimum. Zero counts as
    /// missing, and so does anything too large for a `Duration`.
    pub fn try_parse(input: &str) -> Result<Self, WheelError> {
        let invalid = || WheelError::InvalidDurationInput {
            input: input.to_string(),
        };
        let secs = leading_number(input).ok_or_else(invalid)?;
        Self::checked(secs).ok_or_else(invalid)
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self::checked(secs).unwrap_or_default()
    }

    fn checked(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs == 0.0 {
            return None;
        }
        let secs = secs.max(MIN_SPIN_SECS);
        Duration::try_from_secs_f64(secs).ok()?;
        Some(Self(secs))
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.0)
    }
}

impl Default for SpinDuration {
    fn default() -> Self {
        Self(DEFAULT_SPIN_SECS)
    }
}

/// Longest prefix of `input` (after leading whitespace) that reads as a
/// decimal literal: optional sign, digits with an optional fraction, optional
/// exponent.
fn leading_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn garbage_and_empty_fall_back_to_default() {
        assert_eq!(SpinDuration::parse("abc").as_secs_f64(), 4.0);
        assert_eq!(SpinDuration::parse("").as_secs_f64(), 4.0);
        assert_eq!(SpinDuration::parse("   ").as_secs_f64(), 4.0);
        assert_eq!(SpinDuration::parse(".").as_secs_f64(), 4.0);
    }

    #[test]
    fn tiny_values_are_clamped() {
        assert_eq!(SpinDuration::parse("0.01").as_secs_f64(), 0.5);
        assert_eq!(SpinDuration::parse("-2").as_secs_f64(), 0.5);
    }

    #[test]
    fn zero_counts_as_missing() {
        assert_eq!(SpinDuration::parse("0").as_secs_f64(), 4.0);
        assert_eq!(SpinDuration::parse("0.0").as_secs_f64(), 4.0);
    }

    #[test]
    fn leading_number_with_suffix() {
        assert_eq!(SpinDuration::parse("3.5s").as_secs_f64(), 3.5);
        assert_eq!(SpinDuration::parse("  7 seconds").as_secs_f64(), 7.0);
        assert_eq!(SpinDuration::parse(".75").as_secs_f64(), 0.75);
        assert_eq!(SpinDuration::parse("1e1").as_secs_f64(), 10.0);
        assert_eq!(SpinDuration::parse("2e").as_secs_f64(), 2.0);
    }

    #[test]
    fn overflow_falls_back_to_default() {
        assert_eq!(SpinDuration::parse("1e999").as_secs_f64(), 4.0);
        assert_eq!(SpinDuration::from_secs_f64(f64::NAN).as_secs_f64(), 4.0);
        assert_eq!(SpinDuration::from_secs_f64(f64::INFINITY).as_secs_f64(), 4.0);
    }

    #[test]
    fn unrepresentable_length_falls_back_to_default() {
        let d = SpinDuration::parse("1e20");
        assert_eq!(d.as_secs_f64(), 4.0);
        assert_eq!(d.as_duration(), Duration::from_secs(4));
        assert_matches!(
            SpinDuration::try_parse("1e20"),
            Err(WheelError::InvalidDurationInput { .. })
        );
        assert_eq!(SpinDuration::from_secs_f64(1e20).as_secs_f64(), 4.0);
        assert_eq!(SpinDuration::parse("86400").as_secs_f64(), 86400.0);
    }

    #[test]
    fn try_parse_reports_invalid_input() {
        assert_matches!(
            SpinDuration::try_parse("abc"),
            Err(WheelError::InvalidDurationInput { input }) if input == "abc"
        );
    }

    #[test]
    fn as_duration_matches_secs() {
        let d = SpinDuration::parse("1.5");
        assert_eq!(d.as_duration(), Duration::from_millis(1500));
    }
}
