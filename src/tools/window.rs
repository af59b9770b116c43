//! Time windows for the derived "today" and "upcoming" queries.

use chrono::{DateTime, Duration, FixedOffset, SecondsFormat};

use crate::clock::Clock;

/// Longest look-ahead accepted by the upcoming-events query.
pub const MAX_DAYS_AHEAD: u32 = 3660;

/// A `[time_min, time_max]` window in the caller's local offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub time_min: DateTime<FixedOffset>,
    pub time_max: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Local midnight to 23:59:59.999 of the clock's current day.
    ///
    /// Each bound carries the offset in force at that instant, so a day with
    /// a daylight saving transition spans 23 or 25 hours.
    pub fn today(clock: &dyn Clock) -> Self {
        let date = clock.now().date_naive();
        let time_min = clock.midnight(date);
        let next_midnight = match date.succ_opt() {
            Some(next) => clock.midnight(next),
            None => time_min + Duration::days(1),
        };
        let time_max = next_midnight - Duration::milliseconds(1);
        Self { time_min, time_max }
    }

    /// From `now` to `days` days later. `None` when `days` is out of range.
    pub fn upcoming(now: DateTime<FixedOffset>, days: u32) -> Option<Self> {
        if days > MAX_DAYS_AHEAD {
            return None;
        }
        let time_max = now.checked_add_signed(Duration::days(i64::from(days)))?;
        Some(Self { time_min: now, time_max })
    }

    /// Bounds formatted for the provider (RFC 3339, millisecond precision).
    pub fn bounds(&self) -> (String, String) {
        (
            self.time_min.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.time_max.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{NaiveDate, NaiveTime};

    /// Clock for a zone that moves from -08:00 to -07:00 at 02:00 on 2025-03-09.
    struct SpringForwardClock(DateTime<FixedOffset>);

    impl Clock for SpringForwardClock {
        fn now(&self) -> DateTime<FixedOffset> {
            self.0
        }

        fn midnight(&self, date: NaiveDate) -> DateTime<FixedOffset> {
            let transition = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
            let hours = if date <= transition { -8 } else { -7 };
            let offset = FixedOffset::east_opt(hours * 3600).unwrap();
            date.and_time(NaiveTime::MIN).and_local_timezone(offset).unwrap()
        }
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn test_today_covers_local_calendar_day() {
        let window = TimeWindow::today(&FixedClock(at("2025-03-14T15:09:26-07:00")));
        let (min, max) = window.bounds();

        assert_eq!(min, "2025-03-14T00:00:00.000-07:00");
        assert_eq!(max, "2025-03-14T23:59:59.999-07:00");
        assert_eq!(
            window.time_max - window.time_min,
            Duration::days(1) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_today_just_after_midnight_utc() {
        let (min, max) = TimeWindow::today(&FixedClock(at("2025-01-01T00:00:01Z"))).bounds();
        assert_eq!(min, "2025-01-01T00:00:00.000Z");
        assert_eq!(max, "2025-01-01T23:59:59.999Z");
    }

    #[test]
    fn test_today_on_spring_forward_day_starts_at_local_midnight() {
        let clock = SpringForwardClock(at("2025-03-09T15:00:00-07:00"));
        let window = TimeWindow::today(&clock);
        let (min, max) = window.bounds();

        assert_eq!(min, "2025-03-09T00:00:00.000-08:00");
        assert_eq!(max, "2025-03-09T23:59:59.999-07:00");
        assert_eq!(
            window.time_max - window.time_min,
            Duration::hours(23) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_upcoming_window() {
        let now = at("2025-03-14T15:09:26+02:00");
        let window = TimeWindow::upcoming(now, 7).unwrap();

        assert_eq!(window.time_min, now);
        assert_eq!(window.bounds().1, "2025-03-21T15:09:26.000+02:00");
    }

    #[test]
    fn test_upcoming_zero_days_is_empty_window() {
        let now = at("2025-03-14T15:09:26Z");
        let window = TimeWindow::upcoming(now, 0).unwrap();
        assert_eq!(window.time_min, window.time_max);
    }

    #[test]
    fn test_upcoming_rejects_huge_lookahead() {
        assert!(TimeWindow::upcoming(at("2025-03-14T15:09:26Z"), MAX_DAYS_AHEAD + 1).is_none());
    }
}
