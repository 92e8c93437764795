//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and geolocation.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`geoip`] - Geolocation lookups (HTTP service and disabled mode)

pub mod geoip;
pub mod persistence;
