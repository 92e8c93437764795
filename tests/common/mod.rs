#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use link_endings::application::services::{
    AuthService, ClickService, EndingPoolService, LinkService, StatsService,
};
use link_endings::domain::click_event::VisitEvent;
use link_endings::domain::click_worker::ClickQueue;
use link_endings::domain::geolocation::{GeoLocator, GeoLookup, GeoLookupError};
use link_endings::domain::repositories::{ClickRepository, EndingPoolRepository, LinkRepository};
use link_endings::infrastructure::persistence::InMemoryStore;
use link_endings::state::{
    AppState, DynClickService, DynEndingPoolService, DynLinkService, DynStatsService,
};
use link_endings::utils::ending_generator::{DEFAULT_FORBIDDEN_SUBSTRINGS, EndingGenerator};

pub const API_KEY: &str = "test-api-key";
pub const BASE_URL: &str = "https://s.example.com";

/// Answers every lookup with the same result and counts the calls.
pub struct FixedGeoLocator {
    lookup: GeoLookup,
    calls: AtomicUsize,
}

impl FixedGeoLocator {
    pub fn new(lookup: GeoLookup) -> Self {
        Self {
            lookup,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn berlin() -> Self {
        Self::new(GeoLookup {
            country_code: Some("DE".to_string()),
            country_name: Some("Germany".to_string()),
            region_code: Some("BE".to_string()),
            region_name: Some("Berlin".to_string()),
            zip_code: Some("10115".to_string()),
            latitude: Some(52.52),
            longitude: Some(13.4),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoLocator for FixedGeoLocator {
    async fn locate(&self, _ip: &str) -> Result<GeoLookup, GeoLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup.clone())
    }
}

/// Never answers in time.
pub struct StalledGeoLocator;

#[async_trait]
impl GeoLocator for StalledGeoLocator {
    async fn locate(&self, _ip: &str) -> Result<GeoLookup, GeoLookupError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(GeoLookup::default())
    }
}

/// Everything a test needs around one in-memory store.
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub ending_pool: Arc<DynEndingPoolService>,
    pub link_service: Arc<DynLinkService>,
    pub click_service: Arc<DynClickService>,
    pub stats_service: Arc<DynStatsService>,
    pub click_queue: ClickQueue,
    pub click_rx: mpsc::Receiver<VisitEvent>,
}

impl TestContext {
    pub fn new(geo_locator: Arc<dyn GeoLocator>) -> Self {
        Self::with_options(geo_locator, 8, Vec::new())
    }

    pub fn with_options(
        geo_locator: Arc<dyn GeoLocator>,
        ending_length: usize,
        ignored_ips: Vec<String>,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let links: Arc<dyn LinkRepository> = store.clone();
        let pending: Arc<dyn EndingPoolRepository> = store.clone();
        let clicks: Arc<dyn ClickRepository> = store.clone();

        let generator = EndingGenerator::new(ending_length, DEFAULT_FORBIDDEN_SUBSTRINGS);
        let stats_service = Arc::new(StatsService::new(links.clone(), clicks.clone()));
        let ending_pool = Arc::new(EndingPoolService::new(links.clone(), pending, generator));
        let link_service = Arc::new(LinkService::new(links, ending_pool.clone(), BASE_URL));
        let click_service = Arc::new(ClickService::new(
            clicks,
            geo_locator,
            ignored_ips,
            Duration::from_millis(200),
        ));
        let (click_queue, click_rx) = ClickQueue::channel(100);

        Self {
            store,
            ending_pool,
            link_service,
            click_service,
            stats_service,
            click_queue,
            click_rx,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.link_service.clone(),
            self.stats_service.clone(),
            Arc::new(AuthService::new([API_KEY])),
            self.click_queue.clone(),
            false,
        )
    }
}

pub fn create_test_context() -> TestContext {
    TestContext::new(Arc::new(FixedGeoLocator::berlin()))
}

/// Inserts a fixed peer address, standing in for
/// `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> tower::Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: std::net::SocketAddr = "203.0.113.77:40000".parse().unwrap();
        req.extensions_mut()
            .insert(axum::extract::ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Full application router over an in-memory store.
pub fn test_server(ctx: &TestContext) -> axum_test::TestServer {
    let app = link_endings::routes::router(ctx.state()).layer(MockConnectInfoLayer);
    axum_test::TestServer::new(app).unwrap()
}
