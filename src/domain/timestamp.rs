//! Epoch timestamp normalization and the canonical display format.
//!
//! Trade documents carry epoch values without a unit tag: some writers store
//! seconds, others milliseconds. Every conversion in the crate goes through
//! [`normalize_epoch_ms`] so the inference rule is applied in exactly one place.

use chrono::DateTime;

/// Digit count of a seconds-resolution epoch for any date between 2001 and 2286.
const SECONDS_DIGITS: usize = 10;

/// Canonical rendering used for chart axes and the monthly grouping key.
pub const DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Length of the `YYYY/MM` prefix of [`DISPLAY_FORMAT`].
const MONTH_PREFIX_LEN: usize = 7;

/// Normalize an epoch value of unknown unit to milliseconds.
///
/// A value whose integer part has exactly ten decimal digits is taken as
/// seconds and scaled by 1000; anything else is assumed to already be in
/// milliseconds. Returns `None` for NaN or infinite input.
pub fn normalize_epoch_ms(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let ms = if digit_count(value.trunc().abs()) == SECONDS_DIGITS {
        value * 1000.0
    } else {
        value
    };
    Some(ms.trunc() as i64)
}

/// Parse a raw epoch string and normalize it with [`normalize_epoch_ms`].
pub fn parse_epoch_ms(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(normalize_epoch_ms)
}

fn digit_count(integer: f64) -> usize {
    if integer < 1.0 {
        return 1;
    }
    (integer as u64).to_string().len()
}

/// Render milliseconds since the epoch as `YYYY/MM/DD HH:mm:ss` in UTC.
pub fn format_timestamp_ms(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.format(DISPLAY_FORMAT).to_string())
}

/// Normalize an epoch value of unknown unit, then render it.
pub fn format_epoch(value: f64) -> Option<String> {
    normalize_epoch_ms(value).and_then(format_timestamp_ms)
}

/// `YYYY-MM` grouping key taken from the first seven characters of the
/// canonical rendering.
pub fn month_key(ms: i64) -> Option<String> {
    let formatted = format_timestamp_ms(ms)?;
    let prefix = formatted.get(..MONTH_PREFIX_LEN)?;
    Some(prefix.replace('/', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_values_are_seconds() {
        assert_eq!(normalize_epoch_ms(1_700_000_000.0), Some(1_700_000_000_000));
    }

    #[test]
    fn thirteen_digit_values_are_milliseconds() {
        assert_eq!(
            normalize_epoch_ms(1_700_000_000_123.0),
            Some(1_700_000_000_123)
        );
    }

    #[test]
    fn fractional_seconds_keep_millisecond_part() {
        // integer part still has ten digits
        assert_eq!(normalize_epoch_ms(1_700_000_000.5), Some(1_700_000_000_500));
    }

    #[test]
    fn short_values_are_left_as_milliseconds() {
        assert_eq!(normalize_epoch_ms(0.0), Some(0));
        assert_eq!(normalize_epoch_ms(999_999_999.0), Some(999_999_999));
        assert_eq!(normalize_epoch_ms(12_345.0), Some(12_345));
    }

    #[test]
    fn non_finite_values_have_no_timestamp() {
        assert_eq!(normalize_epoch_ms(f64::NAN), None);
        assert_eq!(normalize_epoch_ms(f64::INFINITY), None);
    }

    #[test]
    fn parse_epoch_trims_and_normalizes() {
        assert_eq!(parse_epoch_ms(" 1700000000 "), Some(1_700_000_000_000));
        assert_eq!(parse_epoch_ms("1700000000000"), Some(1_700_000_000_000));
        assert_eq!(parse_epoch_ms("yesterday"), None);
        assert_eq!(parse_epoch_ms(""), None);
    }

    #[test]
    fn format_uses_slash_separated_utc() {
        // 2023-11-14T22:13:20Z
        assert_eq!(
            format_timestamp_ms(1_700_000_000_000).as_deref(),
            Some("2023/11/14 22:13:20")
        );
    }

    #[test]
    fn format_epoch_accepts_seconds_and_millis_alike() {
        assert_eq!(format_epoch(1_700_000_000.0), format_epoch(1_700_000_000_000.0));
    }

    #[test]
    fn month_key_is_zero_padded() {
        // 2024-03-05T00:00:00Z
        assert_eq!(month_key(1_709_596_800_000).as_deref(), Some("2024-03"));
    }
}
