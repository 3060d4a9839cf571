use chrono::{DateTime, Utc};

/// Elapsed seconds between `start` and `end`.
///
/// Returns `None` when either timestamp is missing; unfinished jobs and
/// steps report no `completed_at`, and their duration is unknown rather
/// than zero. A negative result (clock skew upstream) is returned as-is.
pub fn duration_secs(end: Option<DateTime<Utc>>, start: Option<DateTime<Utc>>) -> Option<f64> {
    let (end, start) = (end?, start?);
    #[allow(clippy::cast_precision_loss)]
    let secs = (end - start).num_milliseconds() as f64 / 1000.0;
    Some(secs)
}

/// Renders a duration for CSV output: `10` for whole seconds, `1.5` otherwise.
pub fn format_secs(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{secs:.0}")
    } else {
        secs.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> Option<DateTime<Utc>> {
        Some(value.parse().unwrap())
    }

    #[test]
    fn test_duration_is_exact_elapsed_seconds() {
        let secs = duration_secs(ts("2024-05-01T00:00:10Z"), ts("2024-05-01T00:00:00Z"));
        assert_eq!(secs, Some(10.0));

        let secs = duration_secs(ts("2024-05-01T01:02:03Z"), ts("2024-05-01T00:00:00Z"));
        assert_eq!(secs, Some(3723.0));
    }

    #[test]
    fn test_duration_keeps_fractional_seconds() {
        let secs = duration_secs(ts("2024-05-01T00:00:01.500Z"), ts("2024-05-01T00:00:00Z"));
        assert_eq!(secs, Some(1.5));
    }

    #[test]
    fn test_missing_timestamp_is_absent_not_zero() {
        assert_eq!(duration_secs(None, ts("2024-05-01T00:00:00Z")), None);
        assert_eq!(duration_secs(ts("2024-05-01T00:00:00Z"), None), None);
        assert_eq!(duration_secs(None, None), None);
    }

    #[test]
    fn test_negative_duration_passes_through() {
        let secs = duration_secs(ts("2024-05-01T00:00:00Z"), ts("2024-05-01T00:00:05Z"));
        assert_eq!(secs, Some(-5.0));
    }

    #[test]
    fn test_offset_timestamps_are_normalised() {
        let secs = duration_secs(ts("2024-05-01T09:00:30+09:00"), ts("2024-05-01T00:00:00Z"));
        assert_eq!(secs, Some(30.0));
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(10.0), "10");
        assert_eq!(format_secs(0.0), "0");
        assert_eq!(format_secs(-5.0), "-5");
        assert_eq!(format_secs(1.5), "1.5");
    }
}
