//! # Subnet Enumeration
//!
//! Derives the /24 peer range of the local address. The client assumes the
//! backend sits on the same home or office LAN, so only the last octet varies.

use std::net::Ipv4Addr;

pub const FIRST_HOST_OCTET: u8 = 1;
pub const LAST_HOST_OCTET: u8 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// The `.1` to `.254` hosts sharing the first three octets of `ip`.
    pub fn host_range_of(ip: Ipv4Addr) -> Self {
        let [a, b, c, _] = ip.octets();
        Self::new(
            Ipv4Addr::new(a, b, c, FIRST_HOST_OCTET),
            Ipv4Addr::new(a, b, c, LAST_HOST_OCTET),
        )
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if start > end {
            0
        } else {
            (end - start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lazy, finite sequence of candidate hosts in ascending order.
///
/// Cloning yields an independent cursor, so a sequence can be walked again
/// from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct SubnetCandidates {
    next: u32,
    end: u32,
    exhausted: bool,
}

impl SubnetCandidates {
    fn over(range: Ipv4Range) -> Self {
        Self {
            next: range.start_addr.into(),
            end: range.end_addr.into(),
            exhausted: range.is_empty(),
        }
    }

    pub fn empty() -> Self {
        Self {
            next: 0,
            end: 0,
            exhausted: true,
        }
    }
}

impl Iterator for SubnetCandidates {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let current: Ipv4Addr = Ipv4Addr::from(self.next);
        if self.next == self.end {
            self.exhausted = true;
        } else {
            self.next += 1;
        }
        Some(current.to_string())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: usize = if self.exhausted {
            0
        } else {
            (self.end - self.next) as usize + 1
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SubnetCandidates {}

/// Candidate hosts to probe for a device whose local address is `local_ip`.
///
/// Returns an empty sequence when the address is unknown or unspecified,
/// which callers treat as "cannot scan".
pub fn enumerate(local_ip: Option<Ipv4Addr>) -> SubnetCandidates {
    match local_ip {
        Some(ip) if !ip.is_unspecified() => SubnetCandidates::over(Ipv4Range::host_range_of(ip)),
        _ => SubnetCandidates::empty(),
    }
}

/// Same as [`enumerate`] for a textual address, unparsable input counts as unavailable.
pub fn enumerate_str(local_ip: &str) -> SubnetCandidates {
    enumerate(local_ip.trim().parse::<Ipv4Addr>().ok())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_yields_254_hosts_of_the_same_24() {
        let hosts: Vec<String> = enumerate(Some(Ipv4Addr::new(192, 168, 1, 56))).collect();
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts.first().map(String::as_str), Some("192.168.1.1"));
        assert_eq!(hosts.last().map(String::as_str), Some("192.168.1.254"));
        for (idx, host) in hosts.iter().enumerate() {
            assert_eq!(host, &format!("192.168.1.{}", idx + 1));
        }
    }

    #[test]
    fn enumerate_keeps_the_local_octet() {
        let hosts: Vec<String> = enumerate_str("10.0.7.56").collect();
        assert!(hosts.contains(&"10.0.7.56".to_string()));
    }

    #[test]
    fn enumerate_ignores_the_last_octet_of_the_input() {
        let from_low: Vec<String> = enumerate_str("172.16.4.1").collect();
        let from_high: Vec<String> = enumerate_str("172.16.4.255").collect();
        assert_eq!(from_low, from_high);
    }

    #[test]
    fn enumerate_unspecified_is_empty() {
        assert_eq!(enumerate(Some(Ipv4Addr::UNSPECIFIED)).count(), 0);
        assert_eq!(enumerate_str("0.0.0.0").count(), 0);
    }

    #[test]
    fn enumerate_unavailable_is_empty() {
        assert_eq!(enumerate(None).count(), 0);
        assert_eq!(enumerate_str("").count(), 0);
        assert_eq!(enumerate_str("not-an-ip").count(), 0);
    }

    #[test]
    fn candidates_are_restartable() {
        let mut candidates = enumerate_str("192.168.0.10");
        let restart = candidates.clone();
        assert_eq!(candidates.next().as_deref(), Some("192.168.0.1"));
        assert_eq!(candidates.len(), 253);
        assert_eq!(restart.len(), 254);
        assert_eq!(restart.take(2).collect::<Vec<_>>(), ["192.168.0.1", "192.168.0.2"]);
    }

    #[test]
    fn range_helpers() {
        let range = Ipv4Range::host_range_of(Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(range.len(), 254);
        assert_eq!(range.start_addr, Ipv4Addr::new(10, 1, 2, 1));
        assert_eq!(range.end_addr, Ipv4Addr::new(10, 1, 2, 254));

        let inverted = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 1));
        assert!(inverted.is_empty());
    }
}
