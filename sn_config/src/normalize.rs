//! Quota unit conversions
//!
//! Providers declare limits per minute, per 15 minutes or per day. Everything is brought down to
//! requests per second before it reaches a bucket. Absent inputs stay absent: callers pick the
//! default, never these helpers.

const SECS_PER_MINUTE: f64 = 60.0;
const MINUTES_PER_WINDOW_15: f64 = 15.0;

/// Requests per minute to requests per second, never negative
#[inline]
pub fn rpm_to_rps(rpm: Option<f64>) -> Option<f64> {
    rpm.map(|rpm| (rpm / SECS_PER_MINUTE).max(0.0))
}

/// Requests per 15 minutes to requests per minute
///
/// Only converts to the per-minute unit; chain through [`rpm_to_rps`] for a rate.
#[inline]
pub fn per_15min_to_rpm(per_15min: Option<f64>) -> Option<f64> {
    per_15min.map(|v| v / MINUTES_PER_WINDOW_15)
}

/// Per-minute figure for a provider that declares both units
///
/// The explicit per-minute value wins; the 15-minute window is only used when it is absent.
pub fn resolve_rpm(per_minute: Option<f64>, per_15min: Option<f64>) -> Option<f64> {
    per_minute.or_else(|| per_15min_to_rpm(per_15min))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_rpm_to_rps() {
        assert_eq!(rpm_to_rps(None), None);
        assert_eq!(rpm_to_rps(Some(120.0)), Some(2.0));
        assert_eq!(rpm_to_rps(Some(0.0)), Some(0.0));
        assert_eq!(rpm_to_rps(Some(-60.0)), Some(0.0));
    }

    #[test]
    fn test_per_15min_to_rpm() {
        assert_eq!(per_15min_to_rpm(None), None);
        assert_eq!(per_15min_to_rpm(Some(150.0)), Some(10.0));
    }

    #[test]
    fn test_resolve_rpm_precedence() {
        assert_eq!(resolve_rpm(Some(12.0), Some(150.0)), Some(12.0));
        assert_eq!(resolve_rpm(None, Some(150.0)), Some(10.0));
        assert_eq!(resolve_rpm(None, None), None);
    }

    proptest! {
        #[test]
        fn prop_rps_is_non_negative(rpm in -1.0e6f64..1.0e6) {
            let rps = rpm_to_rps(Some(rpm)).unwrap();
            prop_assert!(rps >= 0.0);
        }

        #[test]
        fn prop_15min_chain_matches_direct_division(v in 0u32..1_000_000) {
            let rps = rpm_to_rps(per_15min_to_rpm(Some(v as f64))).unwrap();
            let direct = v as f64 / 900.0;
            prop_assert!((rps - direct).abs() <= 1e-9 * direct.max(1.0));
        }
    }
}
