//! IPv4 address sources.

use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, warn};

/// Where the beacon's IPv4 address comes from.
///
/// Implementations must be side-effect free reads. Returning `None` means the
/// feature is unavailable right now (no wireless connection, interface query
/// failed, or only the unspecified address is bound); the caller decides
/// whether and when to retry.
pub trait AddressSource: Send + Sync {
    /// Current IPv4 address of the active wireless interface, if any.
    fn current_ipv4(&self) -> Option<Ipv4Addr>;
}

/// Resolves the address of the active wireless interface by scanning the
/// host's interface table.
#[derive(Debug, Default)]
pub struct WifiAddressSource;

impl WifiAddressSource {
    pub fn new() -> Self {
        Self
    }
}

impl AddressSource for WifiAddressSource {
    fn current_ipv4(&self) -> Option<Ipv4Addr> {
        let interfaces = match if_addrs::get_if_addrs() {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!(error = %e, "Could not query network interfaces");
                return None;
            }
        };

        for interface in &interfaces {
            if interface.is_loopback() || !is_wireless_name(&interface.name) {
                continue;
            }
            let IpAddr::V4(addr) = interface.ip() else {
                continue;
            };
            if addr.is_unspecified() {
                continue;
            }
            debug!(interface = %interface.name, address = %addr, "Resolved wireless IPv4 address");
            return Some(addr);
        }

        debug!("No wireless interface with a usable IPv4 address");
        None
    }
}

/// Returns a fixed address instead of scanning interfaces.
///
/// Used for the `--address` override when the machine is wired or the
/// wireless heuristic picks the wrong interface.
#[derive(Debug, Clone, Copy)]
pub struct StaticAddressSource {
    address: Ipv4Addr,
}

impl StaticAddressSource {
    pub fn new(address: Ipv4Addr) -> Self {
        Self { address }
    }
}

impl AddressSource for StaticAddressSource {
    fn current_ipv4(&self) -> Option<Ipv4Addr> {
        if self.address.is_unspecified() {
            return None;
        }
        Some(self.address)
    }
}

/// Whether an interface name follows a wireless naming convention.
///
/// Covers Linux classic (`wlan0`), Linux predictable (`wlp3s0`, `wls1`,
/// `wlx...`), BSD Atheros (`ath0`), generic `wifi0`, and macOS `en0` (the
/// built-in Wi-Fi interface on every modern Mac laptop).
fn is_wireless_name(name: &str) -> bool {
    name.starts_with("wlan")
        || name.starts_with("wlp")
        || name.starts_with("wls")
        || name.starts_with("wlx")
        || name.starts_with("wifi")
        || name.starts_with("ath")
        || name == "en0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wireless_names_accepted() {
        assert!(is_wireless_name("wlan0"));
        assert!(is_wireless_name("wlp3s0"));
        assert!(is_wireless_name("wls1"));
        assert!(is_wireless_name("wlx00c0ca981234"));
        assert!(is_wireless_name("wifi0"));
        assert!(is_wireless_name("ath0"));
        assert!(is_wireless_name("en0"));
    }

    #[test]
    fn test_wired_names_rejected() {
        assert!(!is_wireless_name("eth0"));
        assert!(!is_wireless_name("enp5s0"));
        assert!(!is_wireless_name("en1"));
        assert!(!is_wireless_name("lo"));
        assert!(!is_wireless_name("docker0"));
        assert!(!is_wireless_name("tun0"));
    }

    #[test]
    fn test_ipv4_bytes_format_as_dotted_decimal() {
        let addr = Ipv4Addr::from([192, 168, 1, 5]);
        assert_eq!(addr.to_string(), "192.168.1.5");
    }

    #[test]
    fn test_ipv4_dotted_decimal_round_trip() {
        for bytes in [[0u8, 0, 0, 1], [10, 0, 0, 1], [172, 16, 254, 3], [255, 255, 255, 255]] {
            let addr = Ipv4Addr::from(bytes);
            let parsed: Ipv4Addr = addr.to_string().parse().unwrap();
            assert_eq!(parsed, addr);
            assert_eq!(parsed.octets(), bytes);
        }
    }

    #[test]
    fn test_static_source_returns_fixed_address() {
        let source = StaticAddressSource::new(Ipv4Addr::new(192, 168, 1, 5));
        assert_eq!(source.current_ipv4(), Some(Ipv4Addr::new(192, 168, 1, 5)));
    }

    #[test]
    fn test_static_source_rejects_unspecified() {
        let source = StaticAddressSource::new(Ipv4Addr::UNSPECIFIED);
        assert_eq!(source.current_ipv4(), None);
    }

    #[test]
    fn test_wifi_source_does_not_panic() {
        // The interface table varies by host; the read must succeed or
        // degrade to None either way.
        let _ = WifiAddressSource::new().current_ipv4();
    }
}
