//! No-op geolocation used when lookups are disabled.

use async_trait::async_trait;

use crate::domain::geolocation::{GeoLocator, GeoLookup, GeoLookupError};

/// Geolocator that knows nothing.
///
/// Every lookup succeeds with an empty result, so clicks are stored with
/// unknown geography and no warning is logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGeoLocator;

impl NullGeoLocator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GeoLocator for NullGeoLocator {
    async fn locate(&self, _ip: &str) -> Result<GeoLookup, GeoLookupError> {
        Ok(GeoLookup::default())
    }
}
