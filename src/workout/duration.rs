// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `MM:SS` durations and paces

use crate::errors::{GarminError, Result};

/// Meters per second in one kilometer per hour, as the workout editor rounds it
const MS_PER_KMH: f64 = 0.27778;

/// Parse `MM:SS` into seconds
///
/// Exactly two colon-separated groups of digits are required. Seconds above
/// 59 are accepted and carried into the total.
pub fn mmss_to_seconds(value: &str) -> Result<u32> {
    let invalid = || GarminError::InvalidDurationFormat(value.to_string());

    let mut parts = value.split(':');
    let (Some(minutes), Some(seconds), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let number = |part: &str| -> Result<u32> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        part.parse().map_err(|_| invalid())
    };

    number(minutes)?
        .checked_mul(60)
        .and_then(|m| m.checked_add(number(seconds).ok()?))
        .ok_or_else(invalid)
}

/// Format seconds as zero-padded `MM:SS`; minutes grow past two digits
pub fn seconds_to_mmss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Convert a `MM:SS` per kilometer pace to meters per second
pub fn pace_to_ms(pace: &str) -> Result<f64> {
    let seconds = mmss_to_seconds(pace)?;
    if seconds == 0 {
        return Err(GarminError::InvalidDurationFormat(format!(
            "{} (a pace must be slower than 00:00)",
            pace
        )));
    }

    let km_h = 60.0 / (f64::from(seconds) / 60.0);
    Ok(km_h * MS_PER_KMH)
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmss_to_seconds() {
        assert_eq!(mmss_to_seconds("30:00").unwrap(), 1800);
        assert_eq!(mmss_to_seconds("05:30").unwrap(), 330);
        assert_eq!(mmss_to_seconds("0:0").unwrap(), 0);
        assert_eq!(mmss_to_seconds("120:00").unwrap(), 7200);
        assert_eq!(mmss_to_seconds("01:75").unwrap(), 135);
    }

    #[test]
    fn test_mmss_to_seconds_rejects_malformed() {
        for input in ["abc", "1:2:3", "", ":", "10:", ":30", "10", "-1:00", "1a:00", " 1:00", "1.5:00"] {
            assert!(
                matches!(mmss_to_seconds(input), Err(GarminError::InvalidDurationFormat(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_mmss_to_seconds_overflow() {
        assert!(mmss_to_seconds("99999999999:00").is_err());
        assert!(mmss_to_seconds("71582789:00").is_err());
    }

    #[test]
    fn test_seconds_to_mmss() {
        assert_eq!(seconds_to_mmss(0), "00:00");
        assert_eq!(seconds_to_mmss(300), "05:00");
        assert_eq!(seconds_to_mmss(135), "02:15");
        assert_eq!(seconds_to_mmss(7200), "120:00");
    }

    #[test]
    fn test_mmss_formatting_is_inverse_of_parsing() {
        for minutes in [0, 1, 9, 10, 45, 99] {
            for seconds in [0, 1, 30, 59] {
                let text = format!("{:02}:{:02}", minutes, seconds);
                assert_eq!(seconds_to_mmss(mmss_to_seconds(&text).unwrap()), text);
            }
        }
    }

    #[test]
    fn test_pace_to_ms() {
        assert!((pace_to_ms("05:00").unwrap() - 3.33336).abs() < 1e-9);
        assert_eq!(round_to_tenth(pace_to_ms("05:00").unwrap()), 3.3);
        assert_eq!(round_to_tenth(pace_to_ms("04:00").unwrap()), 4.2);
        assert_eq!(round_to_tenth(pace_to_ms("06:00").unwrap() * 0.85), 2.4);
    }

    #[test]
    fn test_zero_pace_is_rejected() {
        assert!(matches!(pace_to_ms("00:00"), Err(GarminError::InvalidDurationFormat(_))));
    }
}
