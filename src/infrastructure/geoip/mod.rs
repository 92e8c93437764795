//! Geolocation implementations.
//!
//! - [`HttpGeoLocator`] - JSON HTTP service addressed by a `{ip}` URL template
//! - [`NullGeoLocator`] - Always answers "unknown"; used when no service is configured

pub mod http_geo_locator;
pub mod null_geo_locator;

pub use http_geo_locator::HttpGeoLocator;
pub use null_geo_locator::NullGeoLocator;
