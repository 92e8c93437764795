//! Geolocation through a JSON HTTP service.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

use crate::domain::geolocation::{GeoLocator, GeoLookup, GeoLookupError};

const IP_PLACEHOLDER: &str = "{ip}";

/// Queries a "freegeoip"-style service, e.g. `http://geo.internal/json/{ip}`.
///
/// The response is expected to be a JSON object with `country_code`,
/// `country_name`, `region_code`, `region_name`, `zip_code`, `latitude` and
/// `longitude`; missing fields are treated as unknown.
#[derive(Clone)]
pub struct HttpGeoLocator {
    url_template: String,
    client: Client,
}

impl HttpGeoLocator {
    /// Builds a locator for `url_template`, which must contain `{ip}`.
    ///
    /// # Errors
    ///
    /// Fails if the template has no placeholder or the HTTP client cannot
    /// be built.
    pub fn new(url_template: &str, timeout: Duration) -> Result<Self> {
        if !url_template.contains(IP_PLACEHOLDER) {
            bail!("GEOIP_URL must contain the {IP_PLACEHOLDER} placeholder");
        }

        let client = Client::builder()
            .user_agent(concat!("link-endings/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for geolocation")?;

        Ok(Self {
            url_template: url_template.to_string(),
            client,
        })
    }

    fn url_for(&self, ip: &str) -> String {
        self.url_template.replace(IP_PLACEHOLDER, ip)
    }
}

#[async_trait]
impl GeoLocator for HttpGeoLocator {
    async fn locate(&self, ip: &str) -> Result<GeoLookup, GeoLookupError> {
        let url = self.url_for(ip);
        trace!(%url, "Geolocation request");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeoLookupError::Timeout
            } else {
                GeoLookupError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoLookupError::Status(status.as_u16()));
        }

        response
            .json::<GeoLookup>()
            .await
            .map_err(|e| GeoLookupError::Decode(e.to_string()))
    }
}
