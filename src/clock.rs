//! Wall-clock abstraction.
//!
//! Tool windows ("today", "upcoming") and conference request ids depend on
//! the current time; tests pin it with [`FixedClock`].

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    /// Current time, carrying the local UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Local midnight at the start of `date`, with the offset in force then.
    ///
    /// Defaults to the current offset, which is right for any zone without
    /// daylight saving transitions.
    fn midnight(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        midnight_at_offset(date, *self.now().offset())
    }
}

/// Real system clock in the process's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn midnight(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        // Some zones skip midnight on transition days; the day then starts
        // at the first instant after the gap, which the current offset
        // approximates.
        match Local.from_local_datetime(&date.and_time(NaiveTime::MIN)).earliest() {
            Some(midnight) => midnight.fixed_offset(),
            None => midnight_at_offset(date, *self.now().offset()),
        }
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 timestamp into a fixed clock.
    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

fn midnight_at_offset(date: NaiveDate, offset: FixedOffset) -> DateTime<FixedOffset> {
    let midnight_utc = date.and_time(NaiveTime::MIN) - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::<FixedOffset>::from_naive_utc_and_offset(midnight_utc, offset)
}
