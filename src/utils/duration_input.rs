//! Free-text duration fields and countdown labels
//!
//! Input never fails: anything that does not read as a number is zero.

/// Keep only ASCII digits and decimal points
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Parse a seconds field into whole milliseconds.
///
/// The field is sanitised first, then the longest `digits[.digits]` prefix
/// is read, so `"1.5.2"` is 1.5 seconds and `"."` is zero.
pub fn parse_seconds_ms(text: &str) -> u64 {
    let cleaned = sanitize(text);
    let mut end = 0;
    let mut seen_point = false;
    for (index, c) in cleaned.char_indices() {
        if c == '.' {
            if seen_point {
                break;
            }
            seen_point = true;
        }
        end = index + c.len_utf8();
    }

    let prefix = cleaned[..end].trim_end_matches('.');
    if prefix.is_empty() || prefix == "." {
        return 0;
    }
    prefix
        .parse::<f64>()
        .map(secs_f64_to_ms)
        .unwrap_or(0)
}

/// Convert a seconds value to milliseconds, rounding to nearest.
/// Negative, NaN and infinite inputs become zero.
pub fn secs_f64_to_ms(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    let ms = (secs * 1000.0).round();
    if ms >= u64::MAX as f64 {
        u64::MAX
    } else {
        ms as u64
    }
}

/// Whole seconds shown on the dial: remaining time rounded up
pub fn seconds_left(remaining_ms: u64) -> u64 {
    remaining_ms.div_ceil(1000)
}

/// Format milliseconds as "MM:SS", rounding up to the next second
pub fn format_mm_ss(remaining_ms: u64) -> String {
    let total_secs = seconds_left(remaining_ms);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Format a millisecond duration as seconds for a text field, e.g. `2.5`
pub fn format_seconds_field(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("{}", ms / 1000)
    } else {
        let text = format!("{}.{:03}", ms / 1000, ms % 1000);
        text.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_everything_but_digits_and_points() {
        assert_eq!(sanitize("1a0 s"), "10");
        assert_eq!(sanitize("-2.5e3"), "2.53");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn parse_reads_seconds_with_fraction() {
        assert_eq!(parse_seconds_ms("10"), 10_000);
        assert_eq!(parse_seconds_ms("2.5"), 2_500);
        assert_eq!(parse_seconds_ms("0.0004"), 0);
        assert_eq!(parse_seconds_ms("0.0005"), 1);
        assert_eq!(parse_seconds_ms(".5"), 500);
        assert_eq!(parse_seconds_ms("3."), 3_000);
    }

    #[test]
    fn parse_normalizes_garbage_to_zero() {
        assert_eq!(parse_seconds_ms(""), 0);
        assert_eq!(parse_seconds_ms("."), 0);
        assert_eq!(parse_seconds_ms("abc"), 0);
        assert_eq!(parse_seconds_ms(".."), 0);
    }

    #[test]
    fn parse_stops_at_second_point() {
        assert_eq!(parse_seconds_ms("1.5.2"), 1_500);
        assert_eq!(parse_seconds_ms("-4"), 4_000);
    }

    #[test]
    fn secs_conversion_clamps() {
        assert_eq!(secs_f64_to_ms(-1.0), 0);
        assert_eq!(secs_f64_to_ms(f64::NAN), 0);
        assert_eq!(secs_f64_to_ms(f64::INFINITY), 0);
        assert_eq!(secs_f64_to_ms(1.2346), 1_235);
    }

    #[test]
    fn labels_round_up() {
        assert_eq!(seconds_left(0), 0);
        assert_eq!(seconds_left(1), 1);
        assert_eq!(seconds_left(1_000), 1);
        assert_eq!(seconds_left(1_001), 2);
        assert_eq!(format_mm_ss(61_000), "01:01");
        assert_eq!(format_mm_ss(59_001), "01:00");
    }

    #[test]
    fn seconds_field_round_trips_common_values() {
        assert_eq!(format_seconds_field(10_000), "10");
        assert_eq!(format_seconds_field(2_500), "2.5");
        assert_eq!(format_seconds_field(1_005), "1.005");
    }
}
