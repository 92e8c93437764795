//! DTOs for click statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{ClickGeography, ClickHistogram};
use crate::domain::entities::{HistogramInterval, LocationLevel};

/// Request for clicks over time.
#[derive(Debug, Deserialize, Validate)]
pub struct HistogramRequest {
    #[validate(length(min = 1, max = 64))]
    pub ending: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interval: HistogramInterval,
}

/// Request for clicks per place.
#[derive(Debug, Deserialize, Validate)]
pub struct GeographyRequest {
    #[validate(length(min = 1, max = 64))]
    pub ending: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub level: LocationLevel,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistogramBucketResponse {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistogramResponse {
    pub ending: String,
    pub short_url: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub interval: HistogramInterval,
    pub histogram: Vec<HistogramBucketResponse>,
}

impl HistogramResponse {
    pub fn from_histogram(histogram: ClickHistogram, short_url: String) -> Self {
        let interval = histogram.interval;
        Self {
            ending: histogram.link.ending,
            short_url,
            start_time: histogram.window.start,
            end_time: histogram.window.end,
            interval,
            histogram: histogram
                .buckets
                .into_iter()
                .map(|bucket| HistogramBucketResponse {
                    start_time: bucket.start,
                    end_time: interval.advance(bucket.start),
                    count: bucket.count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocationResponse {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeographyResponse {
    pub ending: String,
    pub short_url: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub level: LocationLevel,
    pub locations: Vec<LocationResponse>,
}

impl GeographyResponse {
    pub fn from_geography(geography: ClickGeography, short_url: String) -> Self {
        Self {
            ending: geography.link.ending,
            short_url,
            start_time: geography.window.start,
            end_time: geography.window.end,
            level: geography.level,
            locations: geography
                .locations
                .into_iter()
                .map(|l| LocationResponse {
                    code: l.code,
                    name: l.name,
                    count: l.count,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_omitted() {
        let histogram: HistogramRequest =
            serde_json::from_str(r#"{ "ending": "docs" }"#).unwrap();
        let geography: GeographyRequest =
            serde_json::from_str(r#"{ "ending": "docs", "type": "postalCode" }"#).unwrap();

        assert_eq!(histogram.interval, HistogramInterval::Day);
        assert!(histogram.start_time.is_none());
        assert_eq!(geography.level, LocationLevel::PostalCode);
    }

    #[test]
    fn test_unknown_interval_rejected() {
        let result =
            serde_json::from_str::<HistogramRequest>(r#"{ "ending": "docs", "interval": "week" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_ending_fails_validation() {
        let request: GeographyRequest = serde_json::from_str(r#"{ "ending": "" }"#).unwrap();
        assert!(request.validate().is_err());
    }
}
