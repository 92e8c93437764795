//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls and business rules behind a small API
//! used by HTTP handlers, the click worker and the admin CLI. They are generic
//! over the repository traits, so the same code runs against PostgreSQL, the
//! in-memory store or test mocks.
//!
//! # Available Services
//!
//! - [`services::ending_pool_service::EndingPoolService`] - Ending allocation and manual reservation
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::click_service::ClickService`] - Privacy-preserving click attribution
//! - [`services::auth_service::AuthService`] - API key authentication

pub mod services;
