//! Geolocation lookup contract used by the click attribution pipeline.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::{Coordinates, Geography};

/// Raw answer of a geolocation service.
///
/// Services of the "freegeoip" family report unknown parts as empty strings
/// and unknown positions as `(0, 0)`; missing fields deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeoLookup {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region_code: Option<String>,
    pub region_name: Option<String>,
    #[serde(alias = "postal_code")]
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeoLookup {
    /// Converts service sentinels into explicit unknowns.
    ///
    /// Empty strings become `None`. Coordinates are kept only when both are
    /// present and they are not exactly `(0, 0)`.
    pub fn into_geography(self) -> Geography {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) if !(latitude == 0.0 && longitude == 0.0) => {
                Some(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        };

        Geography {
            country_code: non_empty(self.country_code),
            country_name: non_empty(self.country_name),
            region_code: non_empty(self.region_code),
            region_name: non_empty(self.region_name),
            postal_code: non_empty(self.zip_code),
            coordinates,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Failures of a geolocation lookup. Always recovered by the caller as
/// "geography unknown".
#[derive(Debug, thiserror::Error)]
pub enum GeoLookupError {
    #[error("Geolocation request failed: {0}")]
    Request(String),

    #[error("Geolocation service answered with status {0}")]
    Status(u16),

    #[error("Geolocation response could not be decoded: {0}")]
    Decode(String),

    #[error("Geolocation lookup timed out")]
    Timeout,
}

/// Looks up the coarse location of an (already anonymized) IP address.
///
/// # Implementations
///
/// - [`crate::infrastructure::geoip::HttpGeoLocator`] - JSON HTTP service
/// - [`crate::infrastructure::geoip::NullGeoLocator`] - geolocation disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Returns the raw lookup result for `ip`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeoLookupError`] when the service cannot be reached or
    /// answers with something unusable.
    async fn locate(&self, ip: &str) -> Result<GeoLookup, GeoLookupError>;
}
