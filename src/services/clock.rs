//! Source of "today" for due-date rules and overdue detection.

use chrono::{Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// The server's local calendar day.
    fn today(&self) -> NaiveDate;

    /// The current UTC calendar day.
    fn utc_today(&self) -> NaiveDate;

    /// Picks the calendar day a submission is validated against.
    ///
    /// A browser-supplied date is trusted only when it is within one day of
    /// the UTC date, which covers every real timezone offset. Anything else
    /// falls back to [`Clock::today`].
    fn resolve_today(&self, client_hint: Option<&str>) -> NaiveDate {
        let utc_today = self.utc_today();
        client_hint
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
            .filter(|day| (*day - utc_today).num_days().abs() <= 1)
            .unwrap_or_else(|| self.today())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn utc_today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn utc_today(&self) -> NaiveDate {
        self.0
    }
}
