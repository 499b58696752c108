//! Defines the resampling granularity used when averaging a series down to a
//! coarser time resolution.

use polars::prelude::{Duration, StartBy};
use std::fmt;
use std::str::FromStr;

/// Represents the bucket width used by the resample pipeline.
///
/// Buckets are calendar aligned: hourly buckets start on the hour, daily buckets at
/// midnight, weekly buckets on Monday at midnight and monthly buckets on the first
/// day of the calendar month. Every dashboard tab uses the same alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// One bucket per clock hour.
    #[default]
    Hourly,
    /// One bucket per calendar day.
    Daily,
    /// One bucket per ISO week, starting Monday.
    Weekly,
    /// One bucket per calendar month.
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
    ];

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// The polars duration string for one bucket.
    pub(crate) fn every(&self) -> &'static str {
        match self {
            Granularity::Hourly => "1h",
            Granularity::Daily => "1d",
            Granularity::Weekly => "1w",
            Granularity::Monthly => "1mo",
        }
    }

    pub(crate) fn bucket_duration(&self) -> Duration {
        Duration::parse(self.every())
    }

    /// Where the first window starts relative to the first data point.
    pub(crate) fn start_by(&self) -> StartBy {
        match self {
            Granularity::Weekly => StartBy::Monday,
            _ => StartBy::WindowBound,
        }
    }
}

/// Formats a `Granularity` using its lowercase name.
///
/// # Examples
///
/// ```
/// use aircast::Granularity;
///
/// assert_eq!(Granularity::Weekly.to_string(), "weekly");
/// ```
impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" | "hour" | "h" | "1h" => Ok(Granularity::Hourly),
            "daily" | "day" | "d" | "1d" => Ok(Granularity::Daily),
            "weekly" | "week" | "w" | "1w" => Ok(Granularity::Weekly),
            "monthly" | "month" | "m" | "1mo" => Ok(Granularity::Monthly),
            other => Err(format!(
                "unknown granularity '{other}', expected one of hourly, daily, weekly, monthly"
            )),
        }
    }
}
