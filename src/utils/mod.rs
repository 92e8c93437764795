//! Utility functions for ending generation and visitor privacy.
//!
//! - [`symbol_codec`] - Integer/string codec over the 32-symbol alphabet
//! - [`ending_generator`] - Candidate ending generation and validity rules
//! - [`anonymize_ip`] - IP address truncation
//! - [`fingerprint`] - Truncated visitor fingerprints
//! - [`request_meta`] - Visitor metadata from HTTP headers

pub mod anonymize_ip;
pub mod ending_generator;
pub mod fingerprint;
pub mod request_meta;
pub mod symbol_codec;
