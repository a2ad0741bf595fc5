//! Host network and identity helpers.

use std::collections::BTreeSet;
use std::net::IpAddr;

use sysinfo::{Networks, System};

/// Non-loopback IPv4 addresses of this host, sorted and deduplicated.
///
/// These are the addresses other devices can use to reach the sync server.
pub fn local_ips() -> Vec<String> {
    let networks = Networks::new_with_refreshed_list();
    let addrs: BTreeSet<IpAddr> = networks
        .list()
        .values()
        .flat_map(|data| data.ip_networks().iter().map(|net| net.addr))
        .collect();
    filter_reachable(addrs)
}

fn filter_reachable(addrs: impl IntoIterator<Item = IpAddr>) -> Vec<String> {
    addrs
        .into_iter()
        .filter_map(|addr| match addr {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
            _ => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|v4| v4.to_string())
        .collect()
}

/// Host name, or `"unknown"` when the OS does not report one.
pub fn host_name() -> String {
    System::host_name()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Platform name announced in handshakes.
pub const fn platform_name() -> &'static str {
    std::env::consts::OS
}
