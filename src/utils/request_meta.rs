//! Visitor metadata extraction from HTTP request headers.

use axum::http::{HeaderMap, header};
use std::net::{IpAddr, SocketAddr};

/// Returns the visitor's IP address as text.
///
/// When `behind_proxy` is set, the left-most `X-Forwarded-For` entry and then
/// `X-Real-IP` are consulted before the socket address. Header values that do
/// not parse as an IP address are ignored. IPv4-mapped IPv6 addresses are
/// reported in their IPv4 form.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_canonical().to_string();
        }
    }

    peer.ip().to_canonical().to_string()
}

/// Returns true when the browser sent `DNT: 1`.
pub fn do_not_track(headers: &HeaderMap) -> bool {
    headers
        .get("dnt")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "1")
}

/// Returns the `Referer` header, falling back to the `Referrer` spelling.
pub fn referrer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::REFERER)
        .or_else(|| headers.get("referrer"))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Returns the `User-Agent` header.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
