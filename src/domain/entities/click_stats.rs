//! Aggregated views over recorded clicks.

use chrono::{DateTime, Datelike, Duration, Months, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Bucket width of a click histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramInterval {
    Hour,
    #[default]
    Day,
    Month,
}

impl HistogramInterval {
    /// Field name understood by PostgreSQL `date_trunc`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Month => "month",
        }
    }

    /// Start of the bucket containing `at`, in UTC.
    pub fn truncate(self, at: DateTime<Utc>) -> DateTime<Utc> {
        let date = at.date_naive();
        let start = match self {
            Self::Hour => date.and_hms_opt(at.hour(), 0, 0),
            Self::Day => date.and_hms_opt(0, 0, 0),
            Self::Month => date
                .with_day0(0)
                .and_then(|first| first.and_hms_opt(0, 0, 0)),
        };
        start.map(|s| s.and_utc()).unwrap_or(at)
    }

    /// Start of the bucket following the one starting at `start`.
    pub fn advance(self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Hour => start + Duration::hours(1),
            Self::Day => start + Duration::days(1),
            Self::Month => start
                .checked_add_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Clicks counted in one histogram bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBucket {
    pub start: DateTime<Utc>,
    pub count: i64,
}

/// Geographic level clicks are grouped by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationLevel {
    #[default]
    Country,
    Region,
    #[serde(alias = "postalCode")]
    PostalCode,
}

/// Clicks counted for one place. Postal codes carry no name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCount {
    pub code: String,
    pub name: Option<String>,
    pub count: i64,
}
