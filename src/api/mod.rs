//! HTTP surface: request/response types, handlers, middleware and the
//! `/api` routes.
//!
//! - [`dto`] - JSON bodies
//! - [`handlers`] - shorten, redirect and health handlers
//! - [`middleware`] - API key authentication and request tracing
//! - [`routes`] - the authenticated `/api` router

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
