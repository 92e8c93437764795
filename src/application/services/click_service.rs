//! Privacy-preserving click attribution.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::click_event::{VisitContext, VisitEvent};
use crate::domain::entities::{Click, Geography, NewClick};
use crate::domain::geolocation::{GeoLocator, GeoLookupError};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::utils::anonymize_ip::anonymize_ip;
use crate::utils::fingerprint::visitor_fingerprint;

/// Turns visits into stored clicks without keeping identifying data.
///
/// # Pipeline
///
/// 1. Anonymize the visitor IP (last IPv4 octet / last 80 IPv6 bits dropped)
/// 2. Honor opt-outs: an ignored visitor IP or `DNT: 1` skips steps 3-4
/// 3. Fingerprint the anonymized IP, user agent and link ID
/// 4. Look up coarse geography for the anonymized IP, bounded by a timeout
///
/// Opted-out visits are still recorded, with the fingerprint and every
/// geography field left empty.
pub struct ClickService<C: ClickRepository + ?Sized, G: GeoLocator + ?Sized> {
    click_repository: Arc<C>,
    geo_locator: Arc<G>,
    ignored_visitor_ips: HashSet<String>,
    geo_timeout: Duration,
}

impl<C: ClickRepository + ?Sized, G: GeoLocator + ?Sized> ClickService<C, G> {
    /// Creates a new click service.
    pub fn new<I>(
        click_repository: Arc<C>,
        geo_locator: Arc<G>,
        ignored_visitor_ips: I,
        geo_timeout: Duration,
    ) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            click_repository,
            geo_locator,
            ignored_visitor_ips: ignored_visitor_ips
                .into_iter()
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
                .collect(),
            geo_timeout,
        }
    }

    /// Returns true if the visitor asked not to be tracked or is on the
    /// configured ignore list.
    pub fn is_opted_out(&self, context: &VisitContext) -> bool {
        context.do_not_track || self.ignored_visitor_ips.contains(context.ip.trim())
    }

    /// Builds the click to store for a visit.
    ///
    /// Never fails: geolocation problems degrade to unknown geography.
    pub async fn attribute(&self, event: &VisitEvent) -> NewClick {
        let mut click = NewClick {
            link_id: event.link_id,
            ending: event.ending.clone(),
            target_url: event.target_url.clone(),
            clicked_at: event.visited_at,
            geography: Geography::default(),
            referrer_url: event.context.referrer.clone(),
            identifying_hash: None,
        };

        if self.is_opted_out(&event.context) {
            debug!(ending = %event.ending, "Visitor opted out, skipping attribution");
            return click;
        }

        let anonymized_ip = anonymize_ip(&event.context.ip);
        let user_agent = event.context.user_agent.as_deref().unwrap_or_default();

        click.identifying_hash = Some(visitor_fingerprint(
            &anonymized_ip,
            user_agent,
            event.link_id,
        ));
        click.geography = self.locate(&anonymized_ip).await;

        click
    }

    /// Persists an attributed click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn store(&self, click: NewClick) -> Result<Click, AppError> {
        self.click_repository.insert(click).await
    }

    /// Attributes and persists a visit in one call.
    ///
    /// # Errors
    ///
    /// See [`Self::store`].
    pub async fn record(&self, event: &VisitEvent) -> Result<Click, AppError> {
        let click = self.attribute(event).await;
        self.store(click).await
    }

    async fn locate(&self, anonymized_ip: &str) -> Geography {
        let lookup = tokio::time::timeout(self.geo_timeout, self.geo_locator.locate(anonymized_ip))
            .await
            .unwrap_or(Err(GeoLookupError::Timeout));

        match lookup {
            Ok(lookup) => lookup.into_geography(),
            Err(e) => {
                warn!(ip = %anonymized_ip, "Geolocation failed, recording unknown geography: {}", e);
                metrics::counter!("click_geo_lookup_failures_total").increment(1);
                Geography::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Coordinates;
    use crate::domain::geolocation::{GeoLookup, MockGeoLocator};
    use crate::domain::repositories::MockClickRepository;
    use crate::utils::fingerprint::FINGERPRINT_LENGTH;

    fn visit(ip: &str, do_not_track: bool) -> VisitEvent {
        VisitEvent::new(
            7,
            "H7KD9X2A".to_string(),
            "https://example.com".to_string(),
            VisitContext {
                ip: ip.to_string(),
                user_agent: Some("Mozilla/5.0".to_string()),
                referrer: Some("https://news.example".to_string()),
                do_not_track,
            },
        )
    }

    fn berlin() -> GeoLookup {
        GeoLookup {
            country_code: Some("DE".to_string()),
            country_name: Some("Germany".to_string()),
            region_code: Some("BE".to_string()),
            region_name: Some("Berlin".to_string()),
            zip_code: Some("10115".to_string()),
            latitude: Some(52.52),
            longitude: Some(13.4),
        }
    }

    fn service(
        geo: MockGeoLocator,
        ignored: Vec<String>,
    ) -> ClickService<MockClickRepository, MockGeoLocator> {
        ClickService::new(
            Arc::new(MockClickRepository::new()),
            Arc::new(geo),
            ignored,
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn test_attribute_looks_up_anonymized_ip() {
        let mut geo = MockGeoLocator::new();
        geo.expect_locate()
            .withf(|ip| ip == "192.168.1.0")
            .times(1)
            .returning(|_| Ok(berlin()));

        let click = service(geo, vec![]).attribute(&visit("192.168.1.42", false)).await;

        assert_eq!(click.link_id, 7);
        assert_eq!(click.geography.country_code.as_deref(), Some("DE"));
        assert_eq!(
            click.geography.coordinates,
            Some(Coordinates {
                latitude: 52.52,
                longitude: 13.4
            })
        );
        assert_eq!(
            click.identifying_hash,
            Some(visitor_fingerprint("192.168.1.0", "Mozilla/5.0", 7))
        );
        assert_eq!(click.identifying_hash.unwrap().len(), FINGERPRINT_LENGTH);
    }

    #[tokio::test]
    async fn test_do_not_track_skips_fingerprint_and_geography() {
        let mut geo = MockGeoLocator::new();
        geo.expect_locate().times(0);

        let event = visit("192.168.1.42", true);
        let click = service(geo, vec![]).attribute(&event).await;

        assert!(click.identifying_hash.is_none());
        assert_eq!(click.geography, Geography::default());
        assert_eq!(click.referrer_url.as_deref(), Some("https://news.example"));
        assert_eq!(click.clicked_at, event.visited_at);
    }

    #[tokio::test]
    async fn test_ignored_ip_is_recorded_without_attribution() {
        let mut geo = MockGeoLocator::new();
        geo.expect_locate().times(0);

        let click = service(geo, vec![" 10.0.0.5 ".to_string()])
            .attribute(&visit("10.0.0.5", false))
            .await;

        assert!(click.identifying_hash.is_none());
        assert_eq!(click.geography, Geography::default());
    }

    #[tokio::test]
    async fn test_zero_coordinates_and_blank_country_stored_as_unknown() {
        let mut geo = MockGeoLocator::new();
        geo.expect_locate().returning(|_| {
            Ok(GeoLookup {
                country_code: Some(String::new()),
                latitude: Some(0.0),
                longitude: Some(0.0),
                ..Default::default()
            })
        });

        let click = service(geo, vec![]).attribute(&visit("8.8.8.8", false)).await;

        assert!(click.geography.coordinates.is_none());
        assert!(click.geography.country_code.is_none());
        assert!(click.identifying_hash.is_some());
    }

    #[tokio::test]
    async fn test_geo_failure_falls_back_to_unknown() {
        let mut geo = MockGeoLocator::new();
        geo.expect_locate()
            .returning(|_| Err(GeoLookupError::Status(503)));

        let click = service(geo, vec![]).attribute(&visit("8.8.8.8", false)).await;

        assert_eq!(click.geography, Geography::default());
        assert!(click.identifying_hash.is_some());
    }

    #[tokio::test]
    async fn test_record_stores_attributed_click() {
        let mut repo = MockClickRepository::new();
        repo.expect_insert()
            .withf(|c| c.identifying_hash.is_none() && c.ending == "H7KD9X2A")
            .times(1)
            .returning(|c| Ok(c.into_click(1)));

        let service = ClickService::new(
            Arc::new(repo),
            Arc::new(MockGeoLocator::new()),
            Vec::new(),
            Duration::from_millis(200),
        );

        let click = service.record(&visit("::1", true)).await.unwrap();

        assert_eq!(click.id, 1);
        assert_eq!(click.target_url, "https://example.com");
    }
}
