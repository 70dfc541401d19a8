use std::net::Ipv4Addr;

use pawprobe_common::network::interface;

/// Source of the device's current local IPv4 address.
pub trait LocalAddressSource: Send + Sync {
    fn local_ipv4(&self) -> Option<Ipv4Addr>;
}

/// Reads the address from the host's network interfaces.
pub struct SystemAddressSource;

impl LocalAddressSource for SystemAddressSource {
    fn local_ipv4(&self) -> Option<Ipv4Addr> {
        interface::local_ipv4()
    }
}

/// An address chosen up front, e.g. by the operator on the command line.
#[derive(Debug, Clone, Copy)]
pub struct StaticAddress(pub Option<Ipv4Addr>);

impl LocalAddressSource for StaticAddress {
    fn local_ipv4(&self) -> Option<Ipv4Addr> {
        self.0
    }
}
