//! Client address extraction
//!
//! The address feeds audit entries and keys anonymous artwork views, so
//! forwarded headers are only honoured up to the configured number of
//! trusted proxies (`TRUSTED_PROXY_COUNT`, default 1).

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};

const DEFAULT_TRUSTED_PROXY_COUNT: usize = 1;

/// Client IP, if one could be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip_from_parts(parts)))
    }
}

fn trusted_proxy_count() -> usize {
    std::env::var("TRUSTED_PROXY_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TRUSTED_PROXY_COUNT)
}

pub fn client_ip_from_parts(parts: &Parts) -> Option<String> {
    let socket_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    extract_client_ip(&parts.headers, socket_addr.as_ref(), trusted_proxy_count())
}

/// Resolve the client address: `X-Forwarded-For` (skipping trusted
/// proxies), then `X-Real-IP`, then the socket peer.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| from_forwarded_for(value, trusted_proxy_count));
    if forwarded.is_some() {
        return forwarded;
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| is_valid_ip(ip));
    if let Some(ip) = real_ip {
        return Some(ip.to_string());
    }

    socket_addr.map(|addr| addr.ip().to_string())
}

/// `client, proxy1, proxy2`: with N trusted proxies the client is the entry
/// just before the last N. Chains shorter than that fall back to the last entry.
fn from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let candidate = if trusted_proxy_count == 0 || ips.len() <= trusted_proxy_count {
        ips.last()
    } else {
        ips.get(ips.len() - trusted_proxy_count - 1)
    };

    candidate
        .filter(|ip| is_valid_ip(ip))
        .map(|ip| ip.to_string())
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}
