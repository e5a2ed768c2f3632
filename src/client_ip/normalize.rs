use std::net::IpAddr;

/// Prefix used to write an IPv4 address as an IPv4-mapped IPv6 address.
const IPV4_MAPPED_PREFIX: &str = "::ffff:";

const BRACKETS: &[char] = &['[', ']'];

/// Split `host:port` the way socket address strings are conventionally split.
///
/// The port is everything after the last colon. A bracketed host must close
/// immediately before that colon; an unbracketed host may not contain a colon
/// (bare IPv6 literals are therefore rejected). Stray brackets reject.
/// The returned host has its brackets removed. The port may be empty.
pub(crate) fn split_host_port(hostport: &str) -> Option<(&str, &str)> {
    let last_colon = hostport.rfind(':')?;

    let (host, host_start, port_search_start) = if hostport.starts_with('[') {
        let end = hostport.find(']')?;
        if end + 1 != last_colon {
            return None;
        }
        (&hostport[1..end], 1, end + 1)
    } else {
        let host = &hostport[..last_colon];
        if host.contains(':') {
            return None;
        }
        (host, 0, 0)
    };

    if hostport[host_start..].contains('[') || hostport[port_search_start..].contains(']') {
        return None;
    }

    Some((host, &hostport[last_colon + 1..]))
}

fn strip_port(raw: &str) -> &str {
    let mut s = raw.trim();
    if s.starts_with('[') && s.contains(']') {
        if let Some((host, _)) = split_host_port(s) {
            return host.trim_matches(BRACKETS);
        }
        s = s.trim_matches(BRACKETS);
    }
    match split_host_port(s) {
        Some((host, _)) => host,
        None => s,
    }
}

fn normalize_once(raw: &str) -> &str {
    let mut s = strip_port(raw);
    if let Some(zone) = s.find('%') {
        s = &s[..zone];
    }
    s.strip_prefix(IPV4_MAPPED_PREFIX).unwrap_or(s).trim()
}

/// Reduce a raw address token to a bare address string.
///
/// Strips surrounding whitespace, a `:port` suffix (including the
/// `[v6]:port` and bare `[v6]` forms), a `%zone` suffix and the `::ffff:`
/// IPv4-mapped prefix. Input that does not look like an address comes back
/// unchanged apart from trimming; it is up to the caller to parse the result.
///
/// Stripping is repeated until nothing changes, so `normalize` is idempotent
/// even for nested forms such as `[192.0.2.1:80]:8080`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut current = raw;
    loop {
        let next = normalize_once(current);
        if next == current {
            return next.to_string();
        }
        current = next;
    }
}

/// Normalize a raw token and parse it as an IP address.
///
/// IPv4-mapped IPv6 addresses are unmapped to IPv4 whatever their spelling,
/// so `::ffff:192.0.2.1` and `0:0:0:0:0:ffff:c000:201` both classify as IPv4.
#[must_use]
pub fn classify(raw: &str) -> Option<IpAddr> {
    let ip: IpAddr = normalize(raw).parse().ok()?;
    Some(match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    })
}
