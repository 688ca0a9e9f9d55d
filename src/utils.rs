// Helper functions.

use std::net::{IpAddr, Ipv6Addr};

use dns_lookup::lookup_addr;

pub(crate) fn timestamp_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Lowercase hex MAC without separators, e.g. `001122334455`.
pub(crate) fn mac_from_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 6 {
        return None;
    }
    Some(bytes.iter().map(|b| format!("{:02x}", b)).collect())
}

/// MAC address encoded as six OID arcs, as in the bridge FDB tables.
pub(crate) fn mac_from_arcs(arcs: &[u32]) -> Option<String> {
    let bytes = arcs
        .iter()
        .map(|arc| u8::try_from(*arc).ok())
        .collect::<Option<Vec<u8>>>()?;
    mac_from_bytes(&bytes)
}

/// Fully expanded lowercase form, e.g. `2001:0db8:0000:...:0001`.
pub(crate) fn expand_ipv6(address: &Ipv6Addr) -> String {
    address
        .segments()
        .iter()
        .map(|segment| format!("{:04x}", segment))
        .collect::<Vec<_>>()
        .join(":")
}

/// Storage form of an address: dotted quad, or expanded IPv6.
pub(crate) fn ip_to_string(address: &IpAddr) -> String {
    match address {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => expand_ipv6(v6),
    }
}

// Map IP address to hostname.
pub(crate) fn get_host_from_ip(address: &IpAddr) -> Option<String> {
    match lookup_addr(address) {
        Ok(host) if host != address.to_string() => Some(host),
        _ => None,
    }
}
