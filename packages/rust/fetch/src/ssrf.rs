//! Shared SSRF guard used by every fetcher that can make outbound network
//! requests. Ported from the crawler's scope-checking logic: before a
//! connection is attempted, reject loopback/private/link-local IPs and the
//! handful of hostnames that resolve to the local machine without a DNS
//! lookup.

use std::net::IpAddr;

use url::Url;

/// True if `url` targets something a crawl should never be allowed to reach.
pub fn is_ssrf_target(url: &Url, allow_localhost: bool) -> bool {
    if allow_localhost {
        return false;
    }

    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    if let Some(host) = url.host_str() {
        if let Ok(ip) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        if host == "localhost"
            || host == "127.0.0.1"
            || host == "[::1]"
            || host.ends_with(".local")
            || host.ends_with(".internal")
        {
            return true;
        }
    }

    false
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
                // 192.0.0.0/24
                || (v4.octets()[0] == 192 && v4.octets()[1] == 0 && v4.octets()[2] == 0)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_loopback_and_private_ranges() {
        assert!(is_ssrf_target(&Url::parse("http://127.0.0.1/").unwrap(), false));
        assert!(is_ssrf_target(&Url::parse("http://10.0.0.5/").unwrap(), false));
        assert!(is_ssrf_target(&Url::parse("http://192.168.1.1/").unwrap(), false));
        assert!(is_ssrf_target(&Url::parse("http://localhost/").unwrap(), false));
        assert!(is_ssrf_target(&Url::parse("http://service.internal/").unwrap(), false));
    }

    #[test]
    fn blocks_non_http_schemes() {
        assert!(is_ssrf_target(&Url::parse("ftp://example.com/").unwrap(), false));
    }

    #[test]
    fn allows_public_hosts() {
        assert!(!is_ssrf_target(&Url::parse("https://docs.example.com/").unwrap(), false));
    }

    #[test]
    fn allow_localhost_flag_bypasses_guard() {
        assert!(!is_ssrf_target(&Url::parse("http://127.0.0.1/").unwrap(), true));
    }
}
