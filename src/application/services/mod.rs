//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_service;
pub mod ending_pool_service;
pub mod link_service;
pub mod stats_service;

pub use auth_service::AuthService;
pub use click_service::ClickService;
pub use ending_pool_service::EndingPoolService;
pub use link_service::{LinkService, ShortenItem};
pub use stats_service::{ClickGeography, ClickHistogram, StatsService, StatsWindow};
