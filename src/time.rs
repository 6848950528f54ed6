use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Source of "now" for every computation that depends on the calendar.
///
/// Reports never read the wall clock directly; callers resolve one date per
/// computation pass so derived states stay consistent within a report.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation used by the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a specific date, for tests and replayed reports.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let midnight = self.0.and_hms_opt(0, 0, 0).unwrap_or_default();
        Utc.from_utc_datetime(&midnight)
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}
