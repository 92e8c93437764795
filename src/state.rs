//! Shared application state injected into request handlers.

use std::sync::Arc;

use crate::application::services::{
    AuthService, ClickService, EndingPoolService, LinkService, StatsService,
};
use crate::domain::click_worker::ClickQueue;
use crate::domain::geolocation::GeoLocator;
use crate::domain::repositories::{ClickRepository, EndingPoolRepository, LinkRepository};

/// Link service over type-erased repositories.
pub type DynLinkService = LinkService<dyn LinkRepository, dyn EndingPoolRepository>;

/// Pool manager over type-erased repositories.
pub type DynEndingPoolService = EndingPoolService<dyn LinkRepository, dyn EndingPoolRepository>;

/// Click service over a type-erased repository and geolocator.
pub type DynClickService = ClickService<dyn ClickRepository, dyn GeoLocator>;

/// Statistics service over type-erased repositories.
pub type DynStatsService = StatsService<dyn LinkRepository, dyn ClickRepository>;

/// State shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub stats_service: Arc<DynStatsService>,
    pub auth_service: Arc<AuthService>,
    pub click_queue: ClickQueue,
    /// Read visitor IPs from forwarding headers instead of the socket.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<DynLinkService>,
        stats_service: Arc<DynStatsService>,
        auth_service: Arc<AuthService>,
        click_queue: ClickQueue,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service,
            stats_service,
            auth_service,
            click_queue,
            behind_proxy,
        }
    }
}
