//! Domain layer containing business entities and contracts.
//!
//! This module defines entities, repository interfaces, the geolocation
//! contract and the click event flow, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`geolocation`] - Geolocation lookup contract
//! - [`errors`] - Allocation error taxonomy
//! - [`click_event`] - Visit event model
//! - [`click_worker`] - Asynchronous click attribution worker
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler resolves the ending and answers with a redirect
//! 2. A [`click_event::VisitEvent`] is queued via [`click_worker::ClickQueue`]
//! 3. [`click_worker::run_click_worker`] attributes it with
//!    [`crate::application::services::ClickService`]
//! 4. The click is persisted via [`repositories::ClickRepository`] with retries

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod errors;
pub mod geolocation;
pub mod repositories;
