//! Numeric Formatter
//!
//! Engineering-style rendering of measured values: the magnitude is scaled
//! by powers of 1000 and tagged with an SI prefix.

/// Prefixes from largest to smallest with the magnitude each one starts at.
const SUFFIXES: [(f64, &str); 8] = [
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "u"),
    (1e-9, "n"),
    (1e-12, "p"),
];

pub const DEFAULT_DECIMALS: usize = 3;

/// Format with three decimals, e.g. `1500.0 -> "1.500k"`.
pub fn format_number(value: f64) -> String {
    format_number_with(value, DEFAULT_DECIMALS)
}

/// Format with a fixed number of decimals and an SI suffix.
///
/// Zero prints without a sign or suffix. Values under 1e-12 keep the `p`
/// prefix and lose their sign once they round to zero. Non-finite values
/// print as Rust formats them.
pub fn format_number_with(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    if value == 0.0 {
        return format!("{:.*}", decimals, 0.0);
    }

    let magnitude = value.abs();
    let index = SUFFIXES
        .iter()
        .position(|(threshold, _)| magnitude >= *threshold)
        .unwrap_or(SUFFIXES.len() - 1);

    let (scale, suffix) = SUFFIXES[index];
    let mantissa = value / scale;

    // Rounding may carry 999.9996 up to 1000.000; move to the next prefix then
    let mut rendered = format!("{:.*}", decimals, mantissa);
    if rendered.starts_with('-') && rendered.parse::<f64>() == Ok(0.0) {
        rendered.remove(0);
    }
    if index > 0 && rendered.trim_start_matches('-').parse::<f64>().map_or(false, |m| m >= 1000.0) {
        let (scale, suffix) = SUFFIXES[index - 1];
        return format!("{:.*}{}", decimals, value / scale, suffix);
    }

    format!("{}{}", rendered, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table() {
        let data = [
            (1.0, "1.000"),
            (-1.0, "-1.000"),
            (10.0, "10.000"),
            (100.0, "100.000"),
            (-100.0, "-100.000"),
            (1e3, "1.000k"),
            (1e4, "10.000k"),
            (1e5, "100.000k"),
            (-1e5, "-100.000k"),
            (1e6, "1.000M"),
            (2.5e9, "2.500G"),
            (1e-1, "100.000m"),
            (1e-2, "10.000m"),
            (1e-3, "1.000m"),
            (1e-4, "100.000u"),
            (1e-5, "10.000u"),
            (1e-6, "1.000u"),
            (4.7e-9, "4.700n"),
            (22e-12, "22.000p"),
        ];
        for (input, expected) in data {
            assert_eq!(format_number(input), expected, "input {}", input);
        }
    }

    #[test]
    fn test_zero_has_no_sign_or_suffix() {
        assert_eq!(format_number(0.0), "0.000");
        assert_eq!(format_number(-0.0), "0.000");
    }

    #[test]
    fn test_tiny_values_stay_pico() {
        assert_eq!(format_number(1e-15), "0.001p");
        assert_eq!(format_number(-1e-15), "-0.001p");
        assert_eq!(format_number(1e-18), "0.000p");
        assert_eq!(format_number(-1e-18), "0.000p");
    }

    #[test]
    fn test_rounding_carry_moves_prefix() {
        assert_eq!(format_number(999.9996), "1.000k");
        assert_eq!(format_number(-0.0009999999), "-1.000m");
    }

    #[test]
    fn test_custom_precision_and_infinity() {
        assert_eq!(format_number_with(1234.5, 1), "1.2k");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }
}
