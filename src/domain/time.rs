use chrono::{DateTime, Duration, Utc};

/// Fixed display offset applied to stored UTC instants before they leave
/// the system. Not a timezone conversion; there is no DST to account for.
pub fn ist_offset() -> Duration {
    Duration::minutes(5 * 60 + 30)
}

/// Shift a stored UTC instant into IST display time. Applied exactly once
/// per value at the response boundary, never stacked.
pub fn normalize(t: DateTime<Utc>) -> DateTime<Utc> {
    t + ist_offset()
}

pub fn normalize_opt(t: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    t.map(normalize)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{ist_offset, normalize, normalize_opt};

    #[test]
    fn normalize_shifts_by_five_hours_thirty_minutes() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(normalize(t) - t, ist_offset());
    }

    #[test]
    fn normalize_crosses_midnight() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 20, 45, 0).unwrap();
        let shifted = normalize(t);
        assert_eq!(shifted, Utc.with_ymd_and_hms(2024, 3, 16, 2, 15, 0).unwrap());
    }

    #[test]
    fn normalize_opt_preserves_none() {
        assert_eq!(normalize_opt(None), None);
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(normalize_opt(Some(t)), Some(normalize(t)));
    }
}
