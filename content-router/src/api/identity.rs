//! Requester identity resolution.
//!
//! Precedence: `X-Real-IP`, then the first valid address in
//! `X-Forwarded-For`, then the peer address of the connection.

use crate::errors::RequestError;
use hyper::header::HeaderMap;
use std::net::{IpAddr, SocketAddr};

const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

pub fn resolve_identity(
    headers: &HeaderMap,
    remote_addr: Option<SocketAddr>,
) -> Result<String, RequestError> {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(ip) = header_str(X_REAL_IP).and_then(parse_ip) {
        return Ok(ip.to_string());
    }

    if let Some(ip) = header_str(X_FORWARDED_FOR).and_then(|v| v.split(',').find_map(parse_ip)) {
        return Ok(ip.to_string());
    }

    remote_addr
        .map(|addr| addr.ip().to_string())
        .ok_or(RequestError::UnresolvedIdentity)
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}
