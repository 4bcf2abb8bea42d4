//! Best-effort discovery of the local machine address.
//!
//! Batches submitted without an explicit source are stamped with this
//! address. Discovery connects an unbound UDP socket towards a public
//! address, which selects the outbound interface without sending packets.

use std::net::{IpAddr, SocketAddr, UdpSocket};

const PROBE_V4: &str = "8.8.8.8:80";
const PROBE_V6: &str = "[2001:4860:4860::8888]:80";

/// Return the preferred non-loopback address, or an empty string.
///
/// IPv4 is preferred; an IPv6 address is used only when no IPv4 route is
/// available.
pub fn local_machine_ip() -> String {
    probe("0.0.0.0:0", PROBE_V4)
        .or_else(|| probe("[::]:0", PROBE_V6))
        .map(|ip| ip.to_string())
        .unwrap_or_default()
}

fn probe(bind: &str, target: &str) -> Option<IpAddr> {
    let socket = UdpSocket::bind(bind).ok()?;
    socket.connect(target).ok()?;
    socket
        .local_addr()
        .ok()
        .map(|addr: SocketAddr| addr.ip())
        .filter(usable)
}

fn usable(ip: &IpAddr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovered_address_parses() {
        let ip = local_machine_ip();
        if !ip.is_empty() {
            let parsed: IpAddr = ip.parse().expect("valid ip address");
            assert!(!parsed.is_loopback());
        }
    }

    #[test]
    fn loopback_is_not_usable() {
        assert!(!usable(&"127.0.0.1".parse().expect("ip")));
        assert!(!usable(&"0.0.0.0".parse().expect("ip")));
        assert!(usable(&"10.1.2.3".parse().expect("ip")));
    }
}
