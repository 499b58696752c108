//! Defines the lookback window applied to a series before it is resampled.

use chrono::{Months, NaiveDateTime, TimeDelta};
use std::fmt;
use std::str::FromStr;

/// The time scope of a dashboard view.
///
/// A scope is always measured back from the series' own latest timestamp, never
/// from the wall clock, so a stale feed still renders its last stretch of data.
///
/// Month and year scopes are calendar aware: `PastMonth` from 2024-03-31 starts at
/// 2024-02-29, `PastYear` from 2024-02-29 starts at 2023-02-28.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterScope {
    /// The last 24 hours.
    PastDay,
    /// The last 7 days.
    #[default]
    PastWeek,
    /// The last calendar month.
    PastMonth,
    /// The last 12 calendar months.
    PastYear,
    /// No filtering.
    AllTime,
}

impl FilterScope {
    pub const ALL: [FilterScope; 5] = [
        FilterScope::PastDay,
        FilterScope::PastWeek,
        FilterScope::PastMonth,
        FilterScope::PastYear,
        FilterScope::AllTime,
    ];

    pub(crate) fn name(&self) -> &'static str {
        match self {
            FilterScope::PastDay => "past-day",
            FilterScope::PastWeek => "past-week",
            FilterScope::PastMonth => "past-month",
            FilterScope::PastYear => "past-year",
            FilterScope::AllTime => "all-time",
        }
    }

    /// Computes the inclusive lower bound of the window ending at `max_time`.
    ///
    /// Returns `None` for [`FilterScope::AllTime`], meaning every row is kept. Also
    /// returns `None` if the subtraction would leave chrono's representable range,
    /// which likewise keeps everything.
    pub fn start_time(&self, max_time: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            FilterScope::PastDay => max_time.checked_sub_signed(TimeDelta::days(1)),
            FilterScope::PastWeek => max_time.checked_sub_signed(TimeDelta::days(7)),
            FilterScope::PastMonth => max_time.checked_sub_months(Months::new(1)),
            FilterScope::PastYear => max_time.checked_sub_months(Months::new(12)),
            FilterScope::AllTime => None,
        }
    }
}

impl fmt::Display for FilterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts both naming schemes seen in the dashboards ("Past Week", "Last Week",
/// "All Data", ...), ignoring case, spaces, dashes and underscores.
impl FromStr for FilterScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "pastday" | "lastday" | "day" => Ok(FilterScope::PastDay),
            "pastweek" | "lastweek" | "week" => Ok(FilterScope::PastWeek),
            "pastmonth" | "lastmonth" | "month" => Ok(FilterScope::PastMonth),
            "pastyear" | "lastyear" | "year" => Ok(FilterScope::PastYear),
            "alltime" | "alldata" | "all" => Ok(FilterScope::AllTime),
            _ => Err(format!(
                "unknown time scope '{s}', expected one of past-day, past-week, past-month, past-year, all-time"
            )),
        }
    }
}
