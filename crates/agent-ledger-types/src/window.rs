//! Spend windows and clocks
//!
//! Monthly spend is the sum of action costs since the first instant of the
//! current calendar month. Which month is "current" depends on the wall
//! clock and on the UTC offset the operator bills in, so both are injected
//! through [`Clock`] rather than read ad hoc.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Half-open interval `[start, ∞)` over which spend accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpendWindow {
    pub start: DateTime<Utc>,
}

impl SpendWindow {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start }
    }

    /// Window for the calendar month containing `now`, with the month
    /// boundary taken in `now`'s own timezone.
    pub fn calendar_month<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let first = today.with_day(1).unwrap_or(today);
        let midnight = first.and_time(NaiveTime::MIN);

        // A DST gap at midnight has no local representation; fall back to
        // reading the wall time as UTC.
        let start = tz
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight));

        Self { start }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start
    }
}

/// Which offset month boundaries are computed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillingOffset {
    /// The server's local timezone
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl FromStr for BillingOffset {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "" => Ok(Self::Local),
            "utc" | "z" => Ok(Self::Utc),
            other => other
                .parse::<FixedOffset>()
                .map(Self::Fixed)
                .map_err(|_| LedgerError::InvalidOffset(s.to_string())),
        }
    }
}

impl fmt::Display for BillingOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("utc"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Source of "now" and of the current spend window
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn current_window(&self) -> SpendWindow;
}

/// Wall-clock time, month boundaries in the configured offset
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: BillingOffset,
}

impl SystemClock {
    pub fn new(offset: BillingOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn current_window(&self) -> SpendWindow {
        let now = Utc::now();
        match self.offset {
            BillingOffset::Local => SpendWindow::calendar_month(&now.with_timezone(&Local)),
            BillingOffset::Utc => SpendWindow::calendar_month(&now),
            BillingOffset::Fixed(offset) => SpendWindow::calendar_month(&now.with_timezone(&offset)),
        }
    }
}

/// A clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        Self { now: now.with_timezone(&Utc.fix()) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }

    fn current_window(&self) -> SpendWindow {
        SpendWindow::calendar_month(&self.now)
    }
}
