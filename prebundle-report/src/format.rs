//! Duration Formatting
//!
//! Durations render as milliseconds with one decimal place while small and
//! switch to seconds with three decimals once they cross a second. The
//! exact switch point is presentation policy; what matters is that the
//! output stays unit-consistent and ordered.

/// Threshold at which millisecond values switch to seconds.
const SECONDS_THRESHOLD_MS: f64 = 1_000.0;

/// Format a millisecond duration for the report.
pub fn format_duration(ms: f64) -> String {
    if ms < SECONDS_THRESHOLD_MS {
        format!("{ms:.1}ms")
    } else {
        format!("{:.3}s", ms / SECONDS_THRESHOLD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values_are_milliseconds() {
        assert_eq!(format_duration(0.0), "0.0ms");
        assert_eq!(format_duration(9.25), "9.2ms");
        assert_eq!(format_duration(842.19), "842.2ms");
    }

    #[test]
    fn test_large_values_are_seconds() {
        let formatted = format_duration(1_500.0);
        assert!(formatted.ends_with('s') && !formatted.ends_with("ms"));
        assert_eq!(formatted, "1.500s");
    }

    #[test]
    fn test_units_are_consistent_per_magnitude() {
        // Every formatted value carries exactly one of the two units.
        for ms in [0.1, 1.0, 50.0, 999.9, 1_000.0, 12_345.6] {
            let s = format_duration(ms);
            assert!(s.ends_with("ms") || s.ends_with('s'));
        }
    }
}
