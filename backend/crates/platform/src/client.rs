//! Client identification utilities

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Resolve the client IP.
///
/// The socket peer address is authoritative. The first `X-Forwarded-For`
/// hop is only consulted when `trust_forwarded` is set, i.e. the service
/// runs behind a reverse proxy that overwrites the header; otherwise any
/// client could pick its own bucket.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded: bool,
) -> Option<IpAddr> {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|xff| xff.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
    };

    if trust_forwarded {
        forwarded().or(direct_ip)
    } else {
        direct_ip
    }
}

/// Rate-limit bucket key for a client. Unknown clients share one bucket.
pub fn client_key(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded: bool,
) -> String {
    extract_client_ip(headers, direct_ip, trust_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forwarded_header_ignored_by_default() {
        let headers = forwarded("192.168.1.1, 10.0.0.1");
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(extract_client_ip(&headers, Some(direct), false), Some(direct));
        assert_eq!(client_key(&headers, None, false), "unknown");
    }

    #[test]
    fn test_forwarded_header_behind_trusted_proxy() {
        let headers = forwarded("192.168.1.1, 10.0.0.1");
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct), true);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));

        // unparsable header falls back to the socket
        let garbage = forwarded("garbage");
        assert_eq!(extract_client_ip(&garbage, Some(direct), true), Some(direct));
    }
}
