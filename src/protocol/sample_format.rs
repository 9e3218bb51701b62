use crate::protocol::NEWLINE;


/// Scalar timestamps below this value are taken to be something other than a millisecond
///  timestamp (typically a tick count) and are replaced by the current clock value.
pub const DEFAULT_SCALAR_TIMESTAMP_THRESHOLD_MS: u32 = 100_000;

/// Separates a sample's value(s) from its unit
pub const UNIT_SEPARATOR: &str = "§";

pub fn normalize_scalar_timestamp(timestamp_ms: u32, threshold_ms: u32, now_ms: u32) -> u32 {
    if timestamp_ms < threshold_ms {
        now_ms
    }
    else {
        timestamp_ms
    }
}

/// `>name:ts:value[§unit]|g`. An empty unit is treated as no unit.
pub fn format_scalar(name: &str, timestamp_ms: u32, rendered_value: &str, unit: Option<&str>) -> String {
    let mut line = format!(">{}:{}:{}", name, timestamp_ms, rendered_value);
    if let Some(unit) = unit.filter(|u| !u.is_empty()) {
        line.push_str(UNIT_SEPARATOR);
        line.push_str(unit);
    }
    line.push_str("|g");
    line.push_str(NEWLINE);
    line
}

/// `>name:ts0:v0;ts1:v1;...[§unit]|g` with element `i` stamped `base_ms + i*dt_ms`. Unlike
///  scalars, a batch writes the unit separator whenever a unit is passed, even an empty one.
pub fn format_batch<T: Copy + Into<f64>>(name: &str, base_ms: u32, dt_ms: u32, values: &[T], unit: Option<&str>) -> String {
    let mut line = format!(">{}:", name);

    let mut timestamp_ms = base_ms;
    for (i, &value) in values.iter().enumerate() {
        if i > 0 {
            line.push(';');
        }
        line.push_str(&format!("{}:{:.6}", timestamp_ms, value.into()));
        timestamp_ms = timestamp_ms.wrapping_add(dt_ms);
    }

    if let Some(unit) = unit {
        line.push_str(UNIT_SEPARATOR);
        line.push_str(unit);
    }
    line.push_str("|g");
    line.push_str(NEWLINE);
    line
}

pub fn format_log(timestamp_ms: u32, text: &str) -> String {
    format!("{}:{}{}", timestamp_ms, text, NEWLINE)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case::tick_count(5, 123_456)]
    #[case::zero(0, 123_456)]
    #[case::just_below(99_999, 123_456)]
    #[case::at_threshold(100_000, 100_000)]
    #[case::real_timestamp(1_700_000, 1_700_000)]
    fn test_normalize_scalar_timestamp(#[case] timestamp_ms: u32, #[case] expected: u32) {
        assert_eq!(normalize_scalar_timestamp(timestamp_ms, DEFAULT_SCALAR_TIMESTAMP_THRESHOLD_MS, 123_456), expected);
    }

    #[rstest]
    #[case::no_unit("temp", 200_000, "21.50", None, ">temp:200000:21.50|g\r\n")]
    #[case::unit("temp", 200_000, "21.50", Some("°C"), ">temp:200000:21.50§°C|g\r\n")]
    #[case::empty_unit("x", 100_000, "42", Some(""), ">x:100000:42|g\r\n")]
    fn test_format_scalar(#[case] name: &str, #[case] timestamp_ms: u32, #[case] value: &str, #[case] unit: Option<&str>, #[case] expected: &str) {
        assert_eq!(format_scalar(name, timestamp_ms, value, unit), expected);
    }

    #[rstest]
    #[case::two_values(1000, 10, vec![1.0, 2.5], Some("V"), ">x:1000:1.000000;1010:2.500000§V|g\r\n")]
    #[case::no_unit(0, 5, vec![-0.25], None, ">x:0:-0.250000|g\r\n")]
    #[case::empty_unit(0, 5, vec![3.0], Some(""), ">x:0:3.000000§|g\r\n")]
    #[case::empty(7, 5, vec![], Some("V"), ">x:§V|g\r\n")]
    #[case::wrap_around(u32::MAX, 1, vec![1.0, 2.0], None, ">x:4294967295:1.000000;0:2.000000|g\r\n")]
    #[case::large_value(0, 1, vec![123456789.125], None, ">x:0:123456789.125000|g\r\n")]
    fn test_format_batch(#[case] base_ms: u32, #[case] dt_ms: u32, #[case] values: Vec<f64>, #[case] unit: Option<&str>, #[case] expected: &str) {
        assert_eq!(format_batch("x", base_ms, dt_ms, &values, unit), expected);
    }

    #[test]
    fn test_format_batch_integer_values() {
        assert_eq!(format_batch("n", 0, 100, &[1i32, -2], None), ">n:0:1.000000;100:-2.000000|g\r\n");
    }

    #[rstest]
    #[case(1234, "booting", "1234:booting\r\n")]
    #[case(0, "", "0:\r\n")]
    fn test_format_log(#[case] timestamp_ms: u32, #[case] text: &str, #[case] expected: &str) {
        assert_eq!(format_log(timestamp_ms, text), expected);
    }
}
