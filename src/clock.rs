//! Source of "now" for everything that needs today's date.
//!
//! Nothing in the calculator or the aggregator reads ambient time; callers
//! hand in a [`Clock`] bound to the canonical timezone.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
    /// Current instant in the canonical timezone
    fn now(&self) -> DateTime<Tz>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock in a fixed timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// A clock stopped at one instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Tz>,
}

impl FixedClock {
    /// Noon on `date` in `tz`, so the local date is never ambiguous
    pub fn at_date(date: NaiveDate, tz: Tz) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        let now = tz
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&noon));
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    #[test]
    fn test_fixed_clock_today() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        let clock = FixedClock::at_date(date, New_York);
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn test_system_clock_uses_timezone() {
        let clock = SystemClock::new(New_York);
        assert_eq!(clock.now().timezone(), New_York);
    }
}
